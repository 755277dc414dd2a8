use std::collections::BTreeMap;

use tracing::warn;
use vault_core::core_api::seasons::{event_name, season_year};
use vault_core::core_api::sources::source_label;
use vault_core::core_api::stat_tables::{ARMOR_STATS, WeaponStat, armor_stat_hash, weapon_stat};
use vault_core::core_api::{AnnotationLookup, Item, StatHash};
use vault_core::destiny_class::DestinyClass;
use vault_core::spreadsheet::ExportRow;

use crate::perks::{add_perks, max_perks};

const MAX_MASTERWORK_TIER: u32 = 10;

/// Community review score for an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DtrRating {
    pub overall_score: f64,
    pub rating_count: u32,
}

pub trait RatingLookup {
    fn rating(&self, item: &Item) -> Option<DtrRating>;
}

/// Used when reviews are unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRatings;

impl RatingLookup for NoRatings {
    fn rating(&self, _item: &Item) -> Option<DtrRating> {
        None
    }
}

/// Ratings keyed by item hash.
impl RatingLookup for BTreeMap<u32, DtrRating> {
    fn rating(&self, item: &Item) -> Option<DtrRating> {
        self.get(&item.hash).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// Adds the `DTR Rating` and `# of Reviews` columns.
    pub reviews_enabled: bool,
}

/// Everything a row builder looks up besides the item itself.
pub struct RowContext<'a> {
    pub annotations: &'a dyn AnnotationLookup,
    pub owner_names: &'a BTreeMap<String, String>,
    pub ratings: &'a dyn RatingLookup,
    pub options: ExportOptions,
}

impl RowContext<'_> {
    fn owner(&self, item: &Item) -> Option<&str> {
        self.owner_names.get(&item.owner).map(String::as_str)
    }
}

pub fn weapon_rows(items: &[&Item], ctx: &RowContext<'_>) -> Vec<ExportRow> {
    let max_perks = max_perks(items);
    items
        .iter()
        .map(|item| weapon_row(item, ctx, max_perks))
        .collect()
}

pub fn armor_rows(items: &[&Item], ctx: &RowContext<'_>) -> Vec<ExportRow> {
    let max_perks = max_perks(items);
    items
        .iter()
        .map(|item| armor_row(item, ctx, max_perks))
        .collect()
}

pub fn ghost_rows(items: &[&Item], ctx: &RowContext<'_>) -> Vec<ExportRow> {
    let max_perks = max_perks(items);
    items
        .iter()
        .map(|item| ghost_row(item, ctx, max_perks))
        .collect()
}

fn identity_columns(row: &mut ExportRow, item: &Item, ctx: &RowContext<'_>) {
    row.insert("Name", item.name.as_str());
    row.insert("Hash", item.hash);
    // Quoted so spreadsheet apps keep the full 64-bit id as text.
    row.insert("Id", format!("\"{}\"", item.id));
    row.insert("Tag", ctx.annotations.tag(&item.id).map(|tag| tag.as_str()));
    row.insert("Tier", item.tier.as_str());
}

fn power_column(row: &mut ExportRow, item: &Item) {
    let label = if item.is_destiny1() { "Light" } else { "Power" };
    row.insert(label, item.primary_stat.map(|stat| stat.value));
}

fn masterwork_columns(row: &mut ExportRow, item: &Item) {
    if !item.is_destiny2() {
        return;
    }
    let masterwork = item.masterwork.as_ref();
    row.insert(
        "Masterwork Type",
        masterwork.and_then(|mw| mw.stat_name.clone()),
    );
    row.insert(
        "Masterwork Tier",
        masterwork
            .and_then(|mw| mw.tier)
            .filter(|&tier| tier > 0)
            .map(|tier| tier.min(MAX_MASTERWORK_TIER)),
    );
}

fn leveled_column(row: &mut ExportRow, item: &Item) {
    if item.is_destiny1() {
        let leveled = (item.percent_complete * 100.0).round();
        row.insert("% Leveled", format!("{leveled:.0}"));
    }
}

fn year_season_columns(row: &mut ExportRow, item: &Item) {
    if item.is_destiny1() {
        row.insert("Year", item.year);
        return;
    }

    let year = item.season.and_then(|season| {
        let year = season_year(season);
        if year.is_none() {
            warn!(item = %item.id, season, "season missing from season table");
        }
        year
    });
    row.insert("Year", year);
    row.insert("Season", item.season);
    row.insert(
        "Event",
        item.event
            .and_then(|event| {
                let name = event_name(event);
                if name.is_none() {
                    warn!(item = %item.id, event, "event missing from event table");
                }
                name
            })
            .unwrap_or(""),
    );
}

fn rating_columns(row: &mut ExportRow, item: &Item, ctx: &RowContext<'_>) {
    if !ctx.options.reviews_enabled {
        return;
    }
    match ctx.ratings.rating(item).filter(|r| r.overall_score != 0.0) {
        Some(rating) => {
            row.insert("DTR Rating", rating.overall_score);
            row.insert("# of Reviews", rating.rating_count);
        }
        None => {
            row.insert("DTR Rating", "N/A");
            row.insert("# of Reviews", "N/A");
        }
    }
}

fn notes_column(row: &mut ExportRow, item: &Item, ctx: &RowContext<'_>) {
    row.insert("Notes", ctx.annotations.notes(&item.id).unwrap_or(""));
}

fn ownership_columns(row: &mut ExportRow, item: &Item) {
    row.insert("Locked", item.locked);
    row.insert("Equipped", item.equipped);
}

fn ghost_row(item: &Item, ctx: &RowContext<'_>, max_perks: usize) -> ExportRow {
    let mut row = ExportRow::new();
    identity_columns(&mut row, item, ctx);
    row.insert("Source", source_label(item));
    row.insert("Owner", ctx.owner(item));
    ownership_columns(&mut row, item);
    notes_column(&mut row, item, ctx);
    add_perks(&mut row, item, max_perks);
    row
}

#[derive(Debug, Default)]
struct WeaponStats {
    recoil: i32,
    aim_assist: i32,
    impact: i32,
    range: i32,
    stability: i32,
    rate_of_fire: i32,
    reload: i32,
    magazine: i32,
    equip_speed: i32,
    draw_time: i32,
    charge_time: i32,
    accuracy: i32,
    blast_radius: i32,
    velocity: i32,
}

impl WeaponStats {
    fn collect(item: &Item) -> Self {
        let mut stats = Self::default();
        for stat in item.stats.iter().flatten().filter(|s| s.value != 0) {
            let Some(kind) = weapon_stat(stat.stat_hash) else {
                continue;
            };
            let slot = match kind {
                WeaponStat::Recoil => &mut stats.recoil,
                WeaponStat::AimAssist => &mut stats.aim_assist,
                WeaponStat::Impact => &mut stats.impact,
                WeaponStat::Range => &mut stats.range,
                WeaponStat::Stability => &mut stats.stability,
                WeaponStat::RateOfFire => &mut stats.rate_of_fire,
                WeaponStat::Reload => &mut stats.reload,
                WeaponStat::Magazine => &mut stats.magazine,
                WeaponStat::EquipSpeed => &mut stats.equip_speed,
                WeaponStat::DrawTime => &mut stats.draw_time,
                WeaponStat::ChargeTime => &mut stats.charge_time,
                WeaponStat::Accuracy => &mut stats.accuracy,
                WeaponStat::BlastRadius => &mut stats.blast_radius,
                WeaponStat::Velocity => &mut stats.velocity,
            };
            *slot = stat.value;
        }
        stats
    }
}

fn weapon_row(item: &Item, ctx: &RowContext<'_>, max_perks: usize) -> ExportRow {
    let mut row = ExportRow::new();
    identity_columns(&mut row, item, ctx);
    row.insert("Type", item.type_name.as_str());
    row.insert("Source", source_label(item));
    power_column(&mut row, item);
    row.insert("Category", item.bucket.type_name.clone());
    row.insert("Element", item.element.clone());
    masterwork_columns(&mut row, item);
    row.insert("Owner", ctx.owner(item));
    leveled_column(&mut row, item);
    ownership_columns(&mut row, item);
    year_season_columns(&mut row, item);
    rating_columns(&mut row, item, ctx);

    let stats = WeaponStats::collect(item);
    row.insert("Recoil", stats.recoil);
    row.insert("AA", stats.aim_assist);
    row.insert("Impact", stats.impact);
    row.insert("Range", stats.range);
    row.insert("Blast Radius", stats.blast_radius);
    row.insert("Velocity", stats.velocity);
    row.insert("Stability", stats.stability);
    row.insert("ROF", stats.rate_of_fire);
    row.insert("Reload", stats.reload);
    row.insert("Mag", stats.magazine);
    row.insert("Equip", stats.equip_speed);
    row.insert("Charge Time", stats.charge_time);
    if item.is_destiny2() {
        row.insert("Draw Time", stats.draw_time);
        row.insert("Accuracy", stats.accuracy);
    }

    notes_column(&mut row, item, ctx);
    add_perks(&mut row, item, max_perks);
    row
}

#[derive(Debug, Clone, Copy, Default)]
struct ArmorStatValue {
    value: i32,
    base: i32,
    pct: i32,
}

fn equippable(item: &Item) -> &str {
    if item.class_type == DestinyClass::Unknown {
        "Any"
    } else {
        &item.class_type_name
    }
}

fn armor_stat_values(item: &Item) -> BTreeMap<StatHash, ArmorStatValue> {
    item.stats
        .iter()
        .flatten()
        .map(|stat| {
            let value = if item.is_destiny1() {
                let pct = match stat.scaled_min {
                    Some(min) if min != 0 => {
                        let split = stat.split.filter(|&s| s != 0).unwrap_or(1);
                        (100.0 * f64::from(min) / f64::from(split)).round() as i32
                    }
                    _ => 0,
                };
                ArmorStatValue {
                    value: stat.value,
                    base: 0,
                    pct,
                }
            } else {
                ArmorStatValue {
                    value: stat.value,
                    base: stat.base,
                    pct: 0,
                }
            };
            (stat.stat_hash, value)
        })
        .collect()
}

fn armor_row(item: &Item, ctx: &RowContext<'_>, max_perks: usize) -> ExportRow {
    let mut row = ExportRow::new();
    identity_columns(&mut row, item, ctx);
    row.insert("Type", item.type_name.as_str());
    row.insert("Source", source_label(item));
    row.insert("Equippable", equippable(item));
    power_column(&mut row, item);
    masterwork_columns(&mut row, item);
    row.insert("Owner", ctx.owner(item));
    leveled_column(&mut row, item);
    if item.is_destiny2() {
        row.insert("Armor2.0", item.energy.is_some());
    }
    ownership_columns(&mut row, item);
    year_season_columns(&mut row, item);
    rating_columns(&mut row, item, ctx);

    let stats = armor_stat_values(item);
    let stat_named = |name: &str| {
        armor_stat_hash(name)
            .and_then(|hash| stats.get(&hash))
            .copied()
            .unwrap_or_default()
    };

    if item.is_destiny1() {
        row.insert("% Quality", item.quality.map(|q| q.min).unwrap_or(0));
        row.insert("% IntQ", stat_named("Intellect").pct);
        row.insert("% DiscQ", stat_named("Discipline").pct);
        row.insert("% StrQ", stat_named("Strength").pct);
        row.insert("Int", stat_named("Intellect").value);
        row.insert("Disc", stat_named("Discipline").value);
        row.insert("Str", stat_named("Strength").value);
    } else {
        for (name, _) in ARMOR_STATS {
            row.insert(*name, stat_named(name).value);
        }
        for (name, _) in ARMOR_STATS {
            row.insert(format!("{name} (Base)"), stat_named(name).base);
        }
        if item.sockets.is_some() {
            row.insert(
                "Seasonal Mod",
                item.specialty_socket_tag.as_deref().unwrap_or(""),
            );
        }
    }

    notes_column(&mut row, item, ctx);
    add_perks(&mut row, item, max_perks);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::core_api::{DestinyVersion, ItemInfos, ItemStat, PrimaryStat};
    use vault_core::spreadsheet::Cell;

    fn ctx<'a>(
        infos: &'a ItemInfos,
        owners: &'a BTreeMap<String, String>,
        ratings: &'a dyn RatingLookup,
        reviews_enabled: bool,
    ) -> RowContext<'a> {
        RowContext {
            annotations: infos,
            owner_names: owners,
            ratings,
            options: ExportOptions { reviews_enabled },
        }
    }

    #[test]
    fn unknown_weapon_stats_are_dropped_and_energy_counts_as_magazine() {
        let item = Item {
            id: "1".to_string(),
            primary_stat: Some(PrimaryStat {
                stat_hash: 1480404414,
                value: 1000,
            }),
            stats: Some(vec![
                ItemStat {
                    stat_hash: 925767036,
                    value: 12,
                    ..ItemStat::default()
                },
                ItemStat {
                    stat_hash: 99,
                    value: 50,
                    ..ItemStat::default()
                },
            ]),
            ..Item::default()
        };
        let infos = ItemInfos::new();
        let owners = BTreeMap::new();
        let rows = weapon_rows(&[&item], &ctx(&infos, &owners, &NoRatings, false));

        assert_eq!(rows[0].get("Mag"), Some(&Cell::Int(12)));
        assert_eq!(rows[0].get("Impact"), Some(&Cell::Int(0)));
        assert!(rows[0].get("DTR Rating").is_none());
    }

    #[test]
    fn leveled_percentage_rounds_halves_up() {
        let item = Item {
            id: "1".to_string(),
            destiny_version: DestinyVersion::Destiny1,
            percent_complete: 0.125,
            ..Item::default()
        };
        let infos = ItemInfos::new();
        let owners = BTreeMap::new();
        let rows = weapon_rows(&[&item], &ctx(&infos, &owners, &NoRatings, false));
        assert_eq!(rows[0].get("% Leveled"), Some(&Cell::from("13")));
    }

    #[test]
    fn missing_rating_renders_not_available() {
        let item = Item {
            id: "1".to_string(),
            ..Item::default()
        };
        let infos = ItemInfos::new();
        let owners = BTreeMap::new();
        let rows = ghost_rows(&[&item], &ctx(&infos, &owners, &NoRatings, true));
        assert!(rows[0].get("DTR Rating").is_none());

        let rows = weapon_rows(&[&item], &ctx(&infos, &owners, &NoRatings, true));
        assert_eq!(rows[0].get("DTR Rating"), Some(&Cell::from("N/A")));
        assert_eq!(rows[0].get("# of Reviews"), Some(&Cell::from("N/A")));

        let mut ratings: BTreeMap<u32, DtrRating> = BTreeMap::new();
        ratings.insert(
            0,
            DtrRating {
                overall_score: 4.5,
                rating_count: 12,
            },
        );
        let rows = weapon_rows(&[&item], &ctx(&infos, &owners, &ratings, true));
        assert_eq!(rows[0].get("DTR Rating"), Some(&Cell::Float(4.5)));
        assert_eq!(rows[0].get("# of Reviews"), Some(&Cell::Int(12)));
    }
}
