use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::locked::PlugDefinition;

/// Mod picker sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModPickerCategory {
    General,
    Helmet,
    Gauntlets,
    Chest,
    Leg,
    ClassItem,
    Seasonal,
}

impl ModPickerCategory {
    pub const ALL: [ModPickerCategory; 7] = [
        Self::General,
        Self::Helmet,
        Self::Gauntlets,
        Self::Chest,
        Self::Leg,
        Self::ClassItem,
        Self::Seasonal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Helmet => "helmet",
            Self::Gauntlets => "gauntlets",
            Self::Chest => "chest",
            Self::Leg => "leg",
            Self::ClassItem => "classitem",
            Self::Seasonal => "seasonal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == name)
    }
}

impl fmt::Display for ModPickerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedArmor2Mod {
    #[serde(rename = "mod")]
    pub mod_def: PlugDefinition,
    pub category: ModPickerCategory,
}

/// Armor 2.0 mods the user requires, grouped by picker category. Like
/// `LockedMap`, every change produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockedArmor2ModMap {
    by_category: BTreeMap<ModPickerCategory, Vec<LockedArmor2Mod>>,
}

impl LockedArmor2ModMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: ModPickerCategory) -> &[LockedArmor2Mod] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn add_mod(&self, locked: LockedArmor2Mod) -> Self {
        let mut next = self.clone();
        let list = next.by_category.entry(locked.category).or_default();
        if !list.iter().any(|m| m.mod_def.hash == locked.mod_def.hash) {
            list.push(locked);
        }
        next
    }

    /// Drop the mod from its category, as clicking its icon does.
    #[must_use]
    pub fn remove_mod(&self, locked: &LockedArmor2Mod) -> Self {
        let mut next = self.clone();
        if let Some(list) = next.by_category.get_mut(&locked.category) {
            list.retain(|m| m.mod_def.hash != locked.mod_def.hash);
            if list.is_empty() {
                next.by_category.remove(&locked.category);
            }
        }
        next
    }

    /// All locked mods, categories in picker order.
    pub fn flatten(&self) -> Vec<&LockedArmor2Mod> {
        self.by_category.values().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}
