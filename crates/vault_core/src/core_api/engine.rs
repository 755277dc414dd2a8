use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::accounts::{AccountSelection, DestinyAccount};
use crate::spreadsheet::{ImportFile, import_tags_notes_from_csv};

use super::annotations::ItemInfos;
use super::error::{CoreError, CoreErrorCode};
use super::types::{ExportKind, Item, Store};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct Profile {
    #[serde(default)]
    accounts: AccountSelection,
    #[serde(default)]
    stores: Vec<Store>,
    #[serde(default)]
    item_infos: ItemInfos,
}

/// A loaded profile: accounts, stores with their items, and annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    profile: Profile,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let profile: Profile = serde_json::from_slice(bytes.as_ref()).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("failed to parse profile: {e}"))
        })?;
        debug!(
            stores = profile.stores.len(),
            annotations = profile.item_infos.len(),
            "opened profile"
        );
        Ok(Session { profile })
    }
}

impl Session {
    pub fn accounts(&self) -> &AccountSelection {
        &self.profile.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut AccountSelection {
        &mut self.profile.accounts
    }

    pub fn active_account(&self) -> Option<&DestinyAccount> {
        self.profile.accounts.active()
    }

    pub fn stores(&self) -> &[Store] {
        &self.profile.stores
    }

    pub fn store(&self, id: &str) -> Result<&Store, CoreError> {
        self.profile
            .stores
            .iter()
            .find(|store| store.id == id)
            .ok_or_else(|| {
                CoreError::new(CoreErrorCode::UnknownStore, format!("no store with id {id}"))
            })
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.profile.stores.iter().flat_map(|store| store.items.iter())
    }

    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.items().find(|item| item.id == id)
    }

    pub fn item_infos(&self) -> &ItemInfos {
        &self.profile.item_infos
    }

    /// Store id to the label shown in the `Owner` column.
    pub fn owner_names(&self) -> BTreeMap<String, String> {
        self.profile
            .stores
            .iter()
            .map(|store| (store.id.clone(), store.owner_label()))
            .collect()
    }

    /// Items that belong in the given spreadsheet, in store order.
    pub fn items_for_export(&self, kind: ExportKind) -> Result<Vec<&Item>, CoreError> {
        if self.profile.stores.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::NoStores,
                "no characters or vault loaded yet; nothing to export",
            ));
        }
        Ok(self.items().filter(|item| kind.includes(item)).collect())
    }

    /// Apply tag/notes CSV files to this profile's annotations.
    pub fn import_tags_notes(&mut self, files: &[ImportFile]) -> Result<Option<usize>, CoreError> {
        let Profile {
            accounts,
            item_infos,
            ..
        } = &mut self.profile;
        import_tags_notes_from_csv(accounts.active(), files, item_infos)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec_pretty(&self.profile).map_err(|e| {
            CoreError::new(CoreErrorCode::Io, format!("failed to serialize profile: {e}"))
        })
    }
}
