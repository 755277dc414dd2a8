use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::info;
use vault_core::accounts::DestinyAccount;
use vault_core::core_api::{CoreError, ExportKind, Session};
use vault_core::loadout::{
    FlatLockedMap, LockableBucket, LockedArmor2Mod, LockedArmor2ModMap, LockedConstraint,
};
use vault_core::spreadsheet::{CsvDownload, download_csv};

mod perks;
mod rows;

pub use perks::{max_perks, perk_names};
pub use rows::{
    DtrRating, ExportOptions, NoRatings, RatingLookup, RowContext, armor_rows, ghost_rows,
    weapon_rows,
};

/// Build the spreadsheet for one export kind from everything the session holds.
pub fn download_csv_files(
    session: &Session,
    kind: ExportKind,
    options: ExportOptions,
    ratings: &dyn RatingLookup,
) -> Result<CsvDownload, CoreError> {
    let items = session.items_for_export(kind)?;
    let owner_names = session.owner_names();
    let ctx = RowContext {
        annotations: session.item_infos(),
        owner_names: &owner_names,
        ratings,
        options,
    };

    let rows = match kind {
        ExportKind::Weapons => weapon_rows(&items, &ctx),
        ExportKind::Armor => armor_rows(&items, &ctx),
        ExportKind::Ghost => ghost_rows(&items, &ctx),
    };
    info!(kind = %kind, rows = rows.len(), "exporting spreadsheet");
    download_csv(kind.filename_stem(), &rows)
}

fn slot_label(bucket: u32) -> String {
    match LockableBucket::from_hash(bucket) {
        Some(slot) => slot.as_str().to_string(),
        None => bucket.to_string(),
    }
}

fn constraint_to_json(constraint: &LockedConstraint) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("key".to_string(), JsonValue::String(constraint.display_key()));
    m.insert("bucket".to_string(), JsonValue::from(constraint.bucket()));
    m.insert(
        "slot".to_string(),
        JsonValue::String(slot_label(constraint.bucket())),
    );
    match constraint {
        LockedConstraint::Item { item, .. } | LockedConstraint::Exclude { item, .. } => {
            m.insert("id".to_string(), JsonValue::String(item.id.clone()));
            m.insert("hash".to_string(), JsonValue::from(item.hash));
            m.insert("name".to_string(), JsonValue::String(item.name.clone()));
        }
        LockedConstraint::Perk { perk: plug, .. } | LockedConstraint::Mod { mod_def: plug, .. } => {
            m.insert("hash".to_string(), JsonValue::from(plug.hash));
            m.insert("name".to_string(), JsonValue::String(plug.name.clone()));
        }
        LockedConstraint::Burn { damage, .. } => {
            m.insert(
                "damage".to_string(),
                JsonValue::String(damage.as_str().to_string()),
            );
        }
    }
    JsonValue::Object(m)
}

fn constraint_list(list: &[&LockedConstraint]) -> JsonValue {
    JsonValue::Array(list.iter().map(|c| constraint_to_json(c)).collect())
}

fn armor2_mod_to_json(locked: &LockedArmor2Mod) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "category".to_string(),
        JsonValue::String(locked.category.as_str().to_string()),
    );
    m.insert("hash".to_string(), JsonValue::from(locked.mod_def.hash));
    m.insert(
        "name".to_string(),
        JsonValue::String(locked.mod_def.name.clone()),
    );
    JsonValue::Object(m)
}

/// The locked set grouped by constraint kind, for other tools to consume.
pub fn render_locked_json(flat: &FlatLockedMap<'_>, armor2_mods: &LockedArmor2ModMap) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("mod".to_string(), constraint_list(&flat.mods));
    out.insert("perk".to_string(), constraint_list(&flat.perks));
    out.insert("burn".to_string(), constraint_list(&flat.burns));
    out.insert("item".to_string(), constraint_list(&flat.items));
    out.insert("exclude".to_string(), constraint_list(&flat.excludes));
    out.insert(
        "armor2_mods".to_string(),
        JsonValue::Array(
            armor2_mods
                .flatten()
                .into_iter()
                .map(armor2_mod_to_json)
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

fn constraint_detail(constraint: &LockedConstraint) -> String {
    match constraint {
        LockedConstraint::Item { item, .. } | LockedConstraint::Exclude { item, .. } => {
            format!("{} ({})", item.name, item.id)
        }
        LockedConstraint::Perk { perk: plug, .. } | LockedConstraint::Mod { mod_def: plug, .. } => {
            format!("{} ({})", plug.name, plug.hash)
        }
        LockedConstraint::Burn { damage, .. } => damage.to_string(),
    }
}

fn write_group(out: &mut String, title: &str, list: &[&LockedConstraint]) {
    if list.is_empty() {
        return;
    }
    writeln!(out, "{title}:").expect("writing to String cannot fail");
    for constraint in list {
        writeln!(
            out,
            "  {:<10} {}",
            slot_label(constraint.bucket()),
            constraint_detail(constraint)
        )
        .expect("writing to String cannot fail");
    }
}

/// Human-readable listing of the locked set, one group per constraint kind.
pub fn render_locked_text(flat: &FlatLockedMap<'_>, armor2_mods: &LockedArmor2ModMap) -> String {
    let mut out = String::new();
    if flat.is_empty() && armor2_mods.is_empty() {
        writeln!(&mut out, "Nothing locked.").expect("writing to String cannot fail");
        return out;
    }

    write_group(&mut out, "Mods", &flat.mods);
    write_group(&mut out, "Perks", &flat.perks);
    write_group(&mut out, "Burns", &flat.burns);
    write_group(&mut out, "Locked items", &flat.items);
    write_group(&mut out, "Excluded items", &flat.excludes);

    if !armor2_mods.is_empty() {
        writeln!(&mut out, "Armor 2.0 mods:").expect("writing to String cannot fail");
        for locked in armor2_mods.flatten() {
            writeln!(
                &mut out,
                "  {:<10} {} ({})",
                locked.category, locked.mod_def.name, locked.mod_def.hash
            )
            .expect("writing to String cannot fail");
        }
    }
    out
}

/// One-line account summary, as the account switcher shows it.
pub fn render_account_line(account: &DestinyAccount, active: bool) -> String {
    let marker = if active { "*" } else { " " };
    format!(
        "{marker} {} {} {} ({})",
        account.display_name,
        account.platform_label(),
        account.version_label(),
        account.membership_id
    )
}
