use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::destiny_class::DestinyClass;

use super::stat_tables::{ATTACK_STAT_HASH, DEFENSE_STAT_HASH, POWER_STAT_HASH};

pub type ItemHash = u32;
pub type BucketHash = u32;
/// Stat hashes are signed: synthetic stats such as the armor total use negative ids.
pub type StatHash = i64;

pub const VAULT_STORE_ID: &str = "vault";
pub const GHOST_BUCKET_HASH: BucketHash = 4023194814;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DestinyVersion {
    Destiny1,
    #[default]
    Destiny2,
}

impl DestinyVersion {
    pub fn number(&self) -> u8 {
        match self {
            Self::Destiny1 => 1,
            Self::Destiny2 => 2,
        }
    }
}

impl TryFrom<u8> for DestinyVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Destiny1),
            2 => Ok(Self::Destiny2),
            other => Err(format!("unsupported destiny version {other}, expected 1 or 2")),
        }
    }
}

impl From<DestinyVersion> for u8 {
    fn from(version: DestinyVersion) -> Self {
        version.number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportKind {
    Weapons,
    Armor,
    Ghost,
}

impl ExportKind {
    pub fn filename_stem(&self) -> &'static str {
        match self {
            Self::Weapons => "destinyWeapons",
            Self::Armor => "destinyArmor",
            Self::Ghost => "destinyGhosts",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weapons => "weapons",
            Self::Armor => "armor",
            Self::Ghost => "ghost",
        }
    }

    /// Whether an item belongs in this spreadsheet. Weapons and armor need a
    /// primary stat; ghosts are picked by bucket alone.
    pub fn includes(&self, item: &Item) -> bool {
        match self {
            Self::Weapons => item
                .primary_stat
                .as_ref()
                .is_some_and(|s| s.stat_hash == ATTACK_STAT_HASH || s.stat_hash == POWER_STAT_HASH),
            Self::Armor => item
                .primary_stat
                .as_ref()
                .is_some_and(|s| s.stat_hash == DEFENSE_STAT_HASH),
            Self::Ghost => item.bucket.hash == GHOST_BUCKET_HASH,
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weapons" | "weapon" => Ok(Self::Weapons),
            "armor" | "armour" => Ok(Self::Armor),
            "ghost" | "ghosts" => Ok(Self::Ghost),
            other => Err(format!(
                "unknown export kind '{other}', expected weapons, armor or ghost"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bucket {
    pub hash: BucketHash,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryStat {
    pub stat_hash: StatHash,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStat {
    pub stat_hash: StatHash,
    pub value: i32,
    /// Value before mods and masterwork; D2 only.
    pub base: i32,
    /// D1 quality roll data.
    pub scaled_min: Option<i32>,
    pub split: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlugItem {
    pub hash: ItemHash,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Socket {
    pub plug: Option<PlugItem>,
    pub plug_options: Vec<PlugItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sockets {
    pub sockets: Vec<Socket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridNode {
    pub name: String,
    pub activated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TalentGrid {
    pub nodes: Vec<GridNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterworkInfo {
    pub stat_name: Option<String>,
    pub tier: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quality {
    pub min: u32,
}

/// An inventory item as delivered by the profile snapshot. Read-only here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: String,
    pub hash: ItemHash,
    pub name: String,
    pub tier: String,
    pub type_name: String,
    pub destiny_version: DestinyVersion,
    pub bucket: Bucket,
    pub class_type: DestinyClass,
    pub class_type_name: String,
    pub owner: String,
    pub equipped: bool,
    pub locked: bool,
    pub primary_stat: Option<PrimaryStat>,
    pub element: Option<String>,
    pub stats: Option<Vec<ItemStat>>,
    pub sockets: Option<Sockets>,
    pub talent_grid: Option<TalentGrid>,
    pub masterwork: Option<MasterworkInfo>,
    pub energy: Option<u32>,
    pub season: Option<u32>,
    pub event: Option<u32>,
    pub source: Option<u32>,
    pub percent_complete: f64,
    pub year: Option<u32>,
    pub quality: Option<Quality>,
    pub specialty_socket_tag: Option<String>,
}

impl Item {
    pub fn is_destiny1(&self) -> bool {
        self.destiny_version == DestinyVersion::Destiny1
    }

    pub fn is_destiny2(&self) -> bool {
        self.destiny_version == DestinyVersion::Destiny2
    }

    pub fn can_be_equipped_by(&self, store: &Store) -> bool {
        if store.is_vault() {
            return false;
        }
        self.class_type == DestinyClass::Unknown || self.class_type == store.class_type
    }
}

/// A character or the vault, with the items it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    #[serde(default)]
    pub class_type: DestinyClass,
    #[serde(default)]
    pub power_level: i32,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Store {
    pub fn is_vault(&self) -> bool {
        self.id == VAULT_STORE_ID
    }

    /// Label used in the spreadsheet `Owner` column.
    pub fn owner_label(&self) -> String {
        if self.is_vault() {
            return "Vault".to_string();
        }
        format!(
            "{}({})",
            capitalize_first_letter(self.class_type.key()),
            self.power_level
        )
    }
}

fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
