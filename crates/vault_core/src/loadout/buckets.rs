use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_api::{BucketHash, GHOST_BUCKET_HASH, Item};

/// Slots the loadout builder can lock, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LockableBucket {
    Helmet,
    Gauntlets,
    Chest,
    Leg,
    ClassItem,
    Ghost,
}

impl LockableBucket {
    pub const ALL: [LockableBucket; 6] = [
        Self::Helmet,
        Self::Gauntlets,
        Self::Chest,
        Self::Leg,
        Self::ClassItem,
        Self::Ghost,
    ];

    pub fn hash(&self) -> BucketHash {
        match self {
            Self::Helmet => 3448274439,
            Self::Gauntlets => 3551918588,
            Self::Chest => 14239492,
            Self::Leg => 20886954,
            Self::ClassItem => 1585787867,
            Self::Ghost => GHOST_BUCKET_HASH,
        }
    }

    pub fn from_hash(hash: BucketHash) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.hash() == hash)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Helmet => "helmet",
            Self::Gauntlets => "gauntlets",
            Self::Chest => "chest",
            Self::Leg => "leg",
            Self::ClassItem => "classitem",
            Self::Ghost => "ghost",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.as_str() == name)
    }
}

impl fmt::Display for LockableBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a bucket in the canonical slot order. Buckets outside it have
/// no position and sort ahead of every lockable slot.
pub fn slot_order(hash: BucketHash) -> Option<usize> {
    LockableBucket::ALL
        .iter()
        .position(|bucket| bucket.hash() == hash)
}

pub fn is_loadout_builder_item(item: &Item) -> bool {
    item.is_destiny2() && LockableBucket::from_hash(item.bucket.hash).is_some()
}
