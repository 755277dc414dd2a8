//! Lock and exclude constraints for the loadout builder.

mod armor2_mods;
mod buckets;
mod locked;
mod picker;

pub use armor2_mods::{LockedArmor2Mod, LockedArmor2ModMap, ModPickerCategory};
pub use buckets::{LockableBucket, is_loadout_builder_item, slot_order};
pub use locked::{
    ConstraintKind, DamageType, FlatLockedMap, LockedConstraint, LockedMap, PlugDefinition,
};
pub use picker::{
    ItemPicker, PickerOutcome, PickerRequest, choose_exclude_item, choose_lock_item,
};
