//! Static table of item sources used for the spreadsheet `Source` column.
//!
//! Entries are searched in order; the first one whose source hashes contain
//! the item's collectible source, or whose item hashes contain the item
//! itself, names the source. There is no catch-all "raid" entry; raids are
//! listed by name.

use super::types::{Item, ItemHash};

struct SourceDef {
    name: &'static str,
    source_hashes: &'static [u32],
    item_hashes: &'static [ItemHash],
}

#[rustfmt::skip]
const SOURCES: &[SourceDef] = &[
    SourceDef { name: "adventure",     source_hashes: &[194661944, 482012099, 636474187],  item_hashes: &[] },
    SourceDef { name: "blackarmory",   source_hashes: &[75031309, 266896577, 948753311],   item_hashes: &[] },
    SourceDef { name: "calus",         source_hashes: &[1675483099, 2882367429],           item_hashes: &[] },
    SourceDef { name: "crownofsorrow", source_hashes: &[3147603678],                       item_hashes: &[] },
    SourceDef { name: "crucible",      source_hashes: &[897576623, 2537301256, 2641169841], item_hashes: &[] },
    SourceDef { name: "deepstone",     source_hashes: &[866530798],                        item_hashes: &[] },
    SourceDef { name: "do",            source_hashes: &[146504277],                        item_hashes: &[] },
    SourceDef { name: "dreaming",      source_hashes: &[2559145507, 3874934421],           item_hashes: &[185321778] },
    SourceDef { name: "drifter",       source_hashes: &[2659839637, 4251047005],           item_hashes: &[] },
    SourceDef { name: "dungeon",       source_hashes: &[506073192, 675740011],             item_hashes: &[] },
    SourceDef { name: "ep",            source_hashes: &[4137108180],                       item_hashes: &[] },
    SourceDef { name: "eververse",     source_hashes: &[860688654, 2048032394],            item_hashes: &[] },
    SourceDef { name: "gambit",        source_hashes: &[2170269026, 3348906688],           item_hashes: &[] },
    SourceDef { name: "garden",        source_hashes: &[1491707941],                       item_hashes: &[] },
    SourceDef { name: "ironbanner",    source_hashes: &[3072862693],                       item_hashes: &[] },
    SourceDef { name: "lastwish",      source_hashes: &[2455011338],                       item_hashes: &[] },
    SourceDef { name: "leviathan",     source_hashes: &[2653618435, 4009509410],           item_hashes: &[] },
    SourceDef { name: "nightfall",     source_hashes: &[1581680964, 3964663093],           item_hashes: &[] },
    SourceDef { name: "prophecy",      source_hashes: &[1788267693],                       item_hashes: &[] },
    SourceDef { name: "scourge",       source_hashes: &[1483048674],                       item_hashes: &[] },
    SourceDef { name: "trials",        source_hashes: &[139599745, 3022766747],            item_hashes: &[] },
    SourceDef { name: "vexoffensive",  source_hashes: &[4146934203],                       item_hashes: &[] },
    SourceDef { name: "zavala",        source_hashes: &[1850609592, 3361454865],           item_hashes: &[] },
];

/// Resolve an item to its source label, or an empty string when no entry
/// matches. D1 items carry no source data and always resolve to "".
pub fn source_label(item: &Item) -> &'static str {
    if !item.is_destiny2() {
        return "";
    }
    SOURCES
        .iter()
        .find(|src| {
            item.source
                .is_some_and(|source| src.source_hashes.contains(&source))
                || src.item_hashes.contains(&item.hash)
        })
        .map(|src| src.name)
        .unwrap_or("")
}
