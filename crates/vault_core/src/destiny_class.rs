use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum DestinyClass {
    Titan,
    Hunter,
    Warlock,
    #[default]
    Unknown,
}

impl DestinyClass {
    pub const TITAN_RAW: i32 = 0;
    pub const HUNTER_RAW: i32 = 1;
    pub const WARLOCK_RAW: i32 = 2;
    pub const UNKNOWN_RAW: i32 = 3;

    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::TITAN_RAW => Self::Titan,
            Self::HUNTER_RAW => Self::Hunter,
            Self::WARLOCK_RAW => Self::Warlock,
            _ => Self::Unknown,
        }
    }

    pub fn raw(&self) -> i32 {
        match *self {
            Self::Titan => Self::TITAN_RAW,
            Self::Hunter => Self::HUNTER_RAW,
            Self::Warlock => Self::WARLOCK_RAW,
            Self::Unknown => Self::UNKNOWN_RAW,
        }
    }

    /// Lowercase class key, as used in store labels before capitalization.
    pub fn key(&self) -> &'static str {
        match *self {
            Self::Titan => "titan",
            Self::Hunter => "hunter",
            Self::Warlock => "warlock",
            Self::Unknown => "unknown",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Titan => "Titan",
            Self::Hunter => "Hunter",
            Self::Warlock => "Warlock",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<i32> for DestinyClass {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<DestinyClass> for i32 {
    fn from(class: DestinyClass) -> Self {
        class.raw()
    }
}

impl fmt::Display for DestinyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
