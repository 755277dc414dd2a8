use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core_api::{BucketHash, Item, ItemHash, Store};

use super::buckets::{is_loadout_builder_item, slot_order};

/// A perk or mod definition from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlugDefinition {
    pub hash: ItemHash,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Arc,
    Solar,
    Void,
    Stasis,
}

impl DamageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arc => "arc",
            Self::Solar => "solar",
            Self::Void => "void",
            Self::Stasis => "stasis",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arc" => Ok(Self::Arc),
            "solar" => Ok(Self::Solar),
            "void" => Ok(Self::Void),
            "stasis" => Ok(Self::Stasis),
            other => Err(format!("unknown damage type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    Item,
    Exclude,
    Perk,
    Mod,
    Burn,
}

/// One restriction handed to the loadout optimizer, scoped to a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LockedConstraint {
    /// Every generated set must use this item.
    Item { bucket: BucketHash, item: Item },
    /// No generated set may use this item.
    Exclude { bucket: BucketHash, item: Item },
    Perk {
        bucket: BucketHash,
        perk: PlugDefinition,
    },
    Mod {
        bucket: BucketHash,
        #[serde(rename = "mod")]
        mod_def: PlugDefinition,
    },
    Burn {
        bucket: BucketHash,
        damage: DamageType,
    },
}

impl LockedConstraint {
    pub fn lock_item(item: &Item) -> Self {
        Self::Item {
            bucket: item.bucket.hash,
            item: item.clone(),
        }
    }

    pub fn exclude_item(item: &Item) -> Self {
        Self::Exclude {
            bucket: item.bucket.hash,
            item: item.clone(),
        }
    }

    pub fn bucket(&self) -> BucketHash {
        match self {
            Self::Item { bucket, .. }
            | Self::Exclude { bucket, .. }
            | Self::Perk { bucket, .. }
            | Self::Mod { bucket, .. }
            | Self::Burn { bucket, .. } => *bucket,
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Item { .. } => ConstraintKind::Item,
            Self::Exclude { .. } => ConstraintKind::Exclude,
            Self::Perk { .. } => ConstraintKind::Perk,
            Self::Mod { .. } => ConstraintKind::Mod,
            Self::Burn { .. } => ConstraintKind::Burn,
        }
    }

    /// Whether both constraints restrict the same thing in the same slot.
    /// Items compare by instance id, plugs by hash, burns by damage type.
    pub fn same_target(&self, other: &Self) -> bool {
        if self.bucket() != other.bucket() {
            return false;
        }
        match (self, other) {
            (Self::Item { item: a, .. }, Self::Item { item: b, .. })
            | (Self::Exclude { item: a, .. }, Self::Exclude { item: b, .. }) => a.id == b.id,
            (Self::Perk { perk: a, .. }, Self::Perk { perk: b, .. })
            | (Self::Mod { mod_def: a, .. }, Self::Mod { mod_def: b, .. }) => a.hash == b.hash,
            (Self::Burn { damage: a, .. }, Self::Burn { damage: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Stable identifier for display lists.
    pub fn display_key(&self) -> String {
        match self {
            Self::Item { item, .. } | Self::Exclude { item, .. } => item.id.clone(),
            Self::Perk { bucket, perk } => format!("{bucket}.{}", perk.hash),
            Self::Mod { bucket, mod_def } => format!("{bucket}.{}", mod_def.hash),
            Self::Burn { bucket, damage } => format!("{bucket}.{damage}"),
        }
    }
}

/// Slot hash to the constraints locked in that slot.
///
/// Every operation returns a new map and leaves the receiver untouched, so
/// consumers can detect changes by comparing values. Slots never hold an
/// empty list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockedMap {
    slots: BTreeMap<BucketHash, Vec<LockedConstraint>>,
}

impl LockedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: BucketHash) -> &[LockedConstraint] {
        self.slots.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn slots(&self) -> impl Iterator<Item = (BucketHash, &[LockedConstraint])> {
        self.slots
            .iter()
            .map(|(bucket, constraints)| (*bucket, constraints.as_slice()))
    }

    pub fn any_locked(&self) -> bool {
        self.slots.values().any(|constraints| !constraints.is_empty())
    }

    pub fn has_item_lock(&self, bucket: BucketHash) -> bool {
        self.get(bucket)
            .iter()
            .any(|c| c.kind() == ConstraintKind::Item)
    }

    /// Add a constraint to its slot. A constraint with the same target
    /// replaces the existing one in place rather than being duplicated.
    #[must_use]
    pub fn add_constraint(&self, constraint: LockedConstraint) -> Self {
        let mut next = self.clone();
        let slot = next.slots.entry(constraint.bucket()).or_default();
        match slot.iter_mut().find(|existing| existing.same_target(&constraint)) {
            Some(existing) => *existing = constraint,
            None => slot.push(constraint),
        }
        next
    }

    /// Remove every constraint with the same target. No-op when absent.
    #[must_use]
    pub fn remove_constraint(&self, constraint: &LockedConstraint) -> Self {
        let mut next = self.clone();
        let bucket = constraint.bucket();
        if let Some(slot) = next.slots.get_mut(&bucket) {
            slot.retain(|existing| !existing.same_target(constraint));
            if slot.is_empty() {
                next.slots.remove(&bucket);
            }
        }
        next
    }

    #[must_use]
    pub fn reset(&self) -> Self {
        Self::default()
    }

    /// Lock every equipped lockable item on the store, replacing whatever was
    /// locked in those slots. Other slots are kept.
    #[must_use]
    pub fn lock_equipped(&self, store: &Store) -> Self {
        let mut next = self.clone();
        for item in store
            .items
            .iter()
            .filter(|item| item.equipped && is_loadout_builder_item(item))
        {
            next.slots
                .insert(item.bucket.hash, vec![LockedConstraint::lock_item(item)]);
        }
        next
    }

    pub fn flatten(&self) -> FlatLockedMap<'_> {
        let mut flat = FlatLockedMap::default();
        for constraint in self.slots.values().flatten() {
            let list = match constraint.kind() {
                ConstraintKind::Mod => &mut flat.mods,
                ConstraintKind::Perk => &mut flat.perks,
                ConstraintKind::Burn => &mut flat.burns,
                ConstraintKind::Item => &mut flat.items,
                ConstraintKind::Exclude => &mut flat.excludes,
            };
            list.push(constraint);
        }

        for list in [
            &mut flat.mods,
            &mut flat.perks,
            &mut flat.burns,
            &mut flat.items,
            &mut flat.excludes,
        ] {
            list.sort_by_key(|c| slot_order(c.bucket()));
        }
        flat
    }
}

/// Constraints grouped by kind, each group in canonical slot order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatLockedMap<'a> {
    pub mods: Vec<&'a LockedConstraint>,
    pub perks: Vec<&'a LockedConstraint>,
    pub burns: Vec<&'a LockedConstraint>,
    pub items: Vec<&'a LockedConstraint>,
    pub excludes: Vec<&'a LockedConstraint>,
}

impl FlatLockedMap<'_> {
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
            && self.perks.is_empty()
            && self.burns.is_empty()
            && self.items.is_empty()
            && self.excludes.is_empty()
    }
}
