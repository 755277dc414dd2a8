//! Stat hashes the spreadsheet export understands.

use super::types::StatHash;

pub const ATTACK_STAT_HASH: StatHash = 368428387;
pub const POWER_STAT_HASH: StatHash = 1480404414;
pub const DEFENSE_STAT_HASH: StatHash = 3897883278;
pub const TOTAL_STAT_HASH: StatHash = -1000;

/// Armor stat columns in export order. `Total` is a synthetic stat.
#[rustfmt::skip]
pub const ARMOR_STATS: &[(&str, StatHash)] = &[
    ("Mobility",   2996146975),
    ("Resilience",  392767087),
    ("Recovery",   1943323491),
    ("Discipline", 1735777505),
    ("Intellect",   144602215),
    ("Strength",   4244567218),
    ("Total",      TOTAL_STAT_HASH),
];

pub fn armor_stat_hash(name: &str) -> Option<StatHash> {
    ARMOR_STATS
        .iter()
        .find(|(stat_name, _)| *stat_name == name)
        .map(|&(_, hash)| hash)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponStat {
    Recoil,
    AimAssist,
    Impact,
    Range,
    Stability,
    RateOfFire,
    Reload,
    Magazine,
    EquipSpeed,
    DrawTime,
    ChargeTime,
    Accuracy,
    BlastRadius,
    Velocity,
}

#[rustfmt::skip]
const WEAPON_STATS: &[(StatHash, WeaponStat)] = &[
    (2715839340, WeaponStat::Recoil),
    (1345609583, WeaponStat::AimAssist),
    (4043523819, WeaponStat::Impact),
    (1240592695, WeaponStat::Range),
    ( 155624089, WeaponStat::Stability),
    (4284893193, WeaponStat::RateOfFire),
    (4188031367, WeaponStat::Reload),
    (3871231066, WeaponStat::Magazine),
    ( 925767036, WeaponStat::Magazine),     // energy weapons report ammo as "Energy"
    ( 943549884, WeaponStat::EquipSpeed),
    ( 447667954, WeaponStat::DrawTime),
    (2961396640, WeaponStat::ChargeTime),
    (1591432999, WeaponStat::Accuracy),
    (3614673599, WeaponStat::BlastRadius),
    (2523465841, WeaponStat::Velocity),
];

/// Map an external stat hash to the weapon stat it feeds, if any.
pub fn weapon_stat(hash: StatHash) -> Option<WeaponStat> {
    WEAPON_STATS
        .iter()
        .find(|(h, _)| *h == hash)
        .map(|&(_, stat)| stat)
}
