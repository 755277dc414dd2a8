use crate::core_api::{Item, Store};

use super::buckets::{is_loadout_builder_item, slot_order};
use super::locked::{LockedConstraint, LockedMap};

/// What the user did with the picker.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    Chosen(Item),
    Cancelled,
}

/// The filter and ordering a picker should apply to its candidates.
pub struct PickerRequest<'a> {
    pub filter: &'a dyn Fn(&Item) -> bool,
    pub sort_key: &'a dyn Fn(&Item) -> Option<usize>,
    pub hide_store_equip: bool,
}

impl PickerRequest<'_> {
    /// Apply the request to a pool of items: filtered, then stably sorted.
    pub fn candidates<'i>(&self, items: impl IntoIterator<Item = &'i Item>) -> Vec<&'i Item> {
        let mut out: Vec<&Item> = items
            .into_iter()
            .filter(|item| (self.filter)(*item))
            .collect();
        out.sort_by_key(|item| (self.sort_key)(*item));
        out
    }
}

/// An interactive item chooser, such as a modal sheet.
pub trait ItemPicker {
    fn pick(&mut self, request: &PickerRequest<'_>) -> PickerOutcome;
}

/// Ask the picker for an item to lock. Slots that already hold an item lock
/// are filtered out. Cancelling leaves the map as it was.
pub fn choose_lock_item<P: ItemPicker + ?Sized>(
    picker: &mut P,
    store: &Store,
    locked: &LockedMap,
) -> LockedMap {
    let free_slot: &dyn Fn(&Item) -> bool =
        &|item: &Item| !locked.has_item_lock(item.bucket.hash);
    choose_item(picker, store, Some(free_slot), locked, LockedConstraint::lock_item)
}

/// Ask the picker for an item to exclude. Cancelling leaves the map as it was.
pub fn choose_exclude_item<P: ItemPicker + ?Sized>(
    picker: &mut P,
    store: &Store,
    locked: &LockedMap,
) -> LockedMap {
    choose_item(picker, store, None, locked, LockedConstraint::exclude_item)
}

fn choose_item<P: ItemPicker + ?Sized>(
    picker: &mut P,
    store: &Store,
    extra_filter: Option<&dyn Fn(&Item) -> bool>,
    locked: &LockedMap,
    to_constraint: fn(&Item) -> LockedConstraint,
) -> LockedMap {
    let filter = |item: &Item| {
        is_loadout_builder_item(item)
            && item.can_be_equipped_by(store)
            && extra_filter.is_none_or(|f| f(item))
    };
    let sort_key = |item: &Item| slot_order(item.bucket.hash);
    let request = PickerRequest {
        filter: &filter,
        sort_key: &sort_key,
        hide_store_equip: true,
    };

    match picker.pick(&request) {
        PickerOutcome::Chosen(item) => locked.add_constraint(to_constraint(&item)),
        PickerOutcome::Cancelled => locked.clone(),
    }
}
