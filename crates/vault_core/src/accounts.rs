use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode, DestinyVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    PlayStation,
    Xbox,
    Blizzard,
    Steam,
    Stadia,
}

impl Platform {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlayStation => "PlayStation",
            Self::Xbox => "Xbox",
            Self::Blizzard => "Blizzard",
            Self::Steam => "Steam",
            Self::Stadia => "Stadia",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinyAccount {
    pub display_name: String,
    pub membership_id: String,
    pub destiny_version: DestinyVersion,
    /// Linked platforms; the first one is the account's primary platform.
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl DestinyAccount {
    pub fn platform_label(&self) -> &'static str {
        self.platforms.first().map(Platform::label).unwrap_or("")
    }

    pub fn version_label(&self) -> &'static str {
        match self.destiny_version {
            DestinyVersion::Destiny1 => "D1",
            DestinyVersion::Destiny2 => "D2",
        }
    }

    pub fn key(&self) -> AccountKey {
        AccountKey {
            membership_id: self.membership_id.clone(),
            destiny_version: self.destiny_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    pub membership_id: String,
    pub destiny_version: DestinyVersion,
}

/// The accounts known to the profile and which one is active.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSelection {
    list: Vec<DestinyAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<AccountKey>,
}

impl AccountSelection {
    pub fn new(list: Vec<DestinyAccount>) -> Self {
        Self { list, active: None }
    }

    pub fn accounts(&self) -> &[DestinyAccount] {
        &self.list
    }

    /// The selected account. Falls back to the first known account when the
    /// remembered selection is missing or stale.
    pub fn active(&self) -> Option<&DestinyAccount> {
        self.active
            .as_ref()
            .and_then(|key| self.list.iter().find(|a| a.key() == *key))
            .or_else(|| self.list.first())
    }

    pub fn is_active(&self, account: &DestinyAccount) -> bool {
        self.active().is_some_and(|active| active.key() == account.key())
    }

    pub fn select(
        &mut self,
        membership_id: &str,
        destiny_version: DestinyVersion,
    ) -> Result<&DestinyAccount, CoreError> {
        let Some(index) = self.list.iter().position(|a| {
            a.membership_id == membership_id && a.destiny_version == destiny_version
        }) else {
            return Err(CoreError::new(
                CoreErrorCode::UnknownAccount,
                format!(
                    "no D{} account with membership id {membership_id}",
                    destiny_version.number()
                ),
            ));
        };

        let account = &self.list[index];
        self.active = Some(account.key());
        Ok(account)
    }
}
