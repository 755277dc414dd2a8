use std::collections::BTreeMap;
use std::path::PathBuf;

use vault_core::core_api::{
    Bucket, CoreErrorCode, DestinyVersion, Engine, ExportKind, GridNode, Item, ItemInfos,
    ItemStat, PlugItem, PrimaryStat, Session, Socket, Sockets, TalentGrid,
};
use vault_core::destiny_class::DestinyClass;
use vault_core::spreadsheet::{Cell, ExportRow};
use vault_render::{
    ExportOptions, NoRatings, RowContext, armor_rows, download_csv_files, ghost_rows, weapon_rows,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_session() -> Session {
    let bytes = std::fs::read(workspace_root().join("tests/fixtures/profile.json"))
        .expect("fixture should be readable");
    Engine::new()
        .open_bytes(bytes)
        .expect("fixture should parse")
}

fn perk_socket(names: &[&str], plugged: usize) -> Socket {
    let options: Vec<PlugItem> = names
        .iter()
        .enumerate()
        .map(|(i, name)| PlugItem {
            hash: i as u32 + 100,
            name: name.to_string(),
        })
        .collect();
    Socket {
        plug: options.get(plugged).cloned(),
        plug_options: options,
    }
}

fn weapon(id: &str, perks: &[&str]) -> Item {
    Item {
        id: id.to_string(),
        name: format!("Weapon {id}"),
        primary_stat: Some(PrimaryStat {
            stat_hash: 1480404414,
            value: 1000,
        }),
        sockets: Some(Sockets {
            sockets: vec![perk_socket(perks, 0)],
        }),
        ..Item::default()
    }
}

fn headers(row: &ExportRow) -> Vec<&str> {
    row.keys().collect()
}

fn csv_lines(contents: &str) -> Vec<&str> {
    contents.split("\r\n").filter(|line| !line.is_empty()).collect()
}

#[test]
fn perk_columns_are_padded_to_the_widest_item() {
    let three = weapon("1", &["A", "B", "C"]);
    let five = weapon("2", &["A", "B", "C", "D", "E"]);
    let infos = ItemInfos::new();
    let owners = BTreeMap::new();
    let ctx = RowContext {
        annotations: &infos,
        owner_names: &owners,
        ratings: &NoRatings,
        options: ExportOptions::default(),
    };

    let rows = weapon_rows(&[&three, &five], &ctx);
    assert_eq!(rows.len(), 2);
    for row in &rows {
        let perk_keys: Vec<&str> = row.keys().filter(|k| k.starts_with("Perks ")).collect();
        assert_eq!(
            perk_keys,
            vec!["Perks 0", "Perks 1", "Perks 2", "Perks 3", "Perks 4"]
        );
    }
    assert_eq!(rows[0].get("Perks 0"), Some(&Cell::from("A*")));
    assert_eq!(rows[0].get("Perks 2"), Some(&Cell::from("C")));
    assert_eq!(rows[0].get("Perks 3"), Some(&Cell::Empty));
    assert_eq!(rows[0].get("Perks 4"), Some(&Cell::Empty));
    assert_eq!(rows[1].get("Perks 4"), Some(&Cell::from("E")));
}

#[test]
fn talent_grid_nodes_drop_filler_and_star_activated() {
    let item = Item {
        id: "9".to_string(),
        destiny_version: DestinyVersion::Destiny1,
        talent_grid: Some(TalentGrid {
            nodes: vec![
                GridNode {
                    name: "Upgrade Defense".to_string(),
                    activated: true,
                },
                GridNode {
                    name: "Hand Cannon Chroma".to_string(),
                    activated: false,
                },
                GridNode {
                    name: "Outlaw".to_string(),
                    activated: true,
                },
            ],
        }),
        ..Item::default()
    };
    let infos = ItemInfos::new();
    let owners = BTreeMap::new();
    let ctx = RowContext {
        annotations: &infos,
        owner_names: &owners,
        ratings: &NoRatings,
        options: ExportOptions::default(),
    };

    let rows = ghost_rows(&[&item], &ctx);
    assert_eq!(rows[0].get("Perks 0"), Some(&Cell::from("Hand Cannon Chroma")));
    assert_eq!(rows[0].get("Perks 1"), Some(&Cell::from("Outlaw*")));
    assert!(rows[0].get("Perks 2").is_none());
}

#[test]
fn destiny1_armor_uses_light_and_quality_columns() {
    let item = Item {
        id: "10".to_string(),
        destiny_version: DestinyVersion::Destiny1,
        class_type: DestinyClass::Warlock,
        class_type_name: "Warlock".to_string(),
        bucket: Bucket {
            hash: 3448274439,
            type_name: Some("Helmet".to_string()),
        },
        primary_stat: Some(PrimaryStat {
            stat_hash: 3897883278,
            value: 320,
        }),
        percent_complete: 0.456,
        year: Some(2),
        stats: Some(vec![ItemStat {
            stat_hash: 144602215,
            value: 60,
            scaled_min: Some(45),
            split: Some(60),
            ..ItemStat::default()
        }]),
        ..Item::default()
    };
    let infos = ItemInfos::new();
    let owners = BTreeMap::new();
    let ctx = RowContext {
        annotations: &infos,
        owner_names: &owners,
        ratings: &NoRatings,
        options: ExportOptions::default(),
    };

    let row = &armor_rows(&[&item], &ctx)[0];
    assert_eq!(row.get("Light"), Some(&Cell::Int(320)));
    assert!(row.get("Power").is_none());
    assert!(row.get("Season").is_none());
    assert!(row.get("Masterwork Tier").is_none());
    assert_eq!(row.get("Equippable"), Some(&Cell::from("Warlock")));
    assert_eq!(row.get("% Leveled"), Some(&Cell::from("46")));
    assert_eq!(row.get("Year"), Some(&Cell::Int(2)));
    assert_eq!(row.get("% IntQ"), Some(&Cell::Int(75)));
    assert_eq!(row.get("Int"), Some(&Cell::Int(60)));
    assert_eq!(row.get("% DiscQ"), Some(&Cell::Int(0)));
}

#[test]
fn weapon_export_from_profile() {
    let session = fixture_session();
    let download = download_csv_files(
        &session,
        ExportKind::Weapons,
        ExportOptions::default(),
        &NoRatings,
    )
    .expect("export should succeed");

    assert_eq!(download.filename, "destinyWeapons.csv");
    assert_eq!(download.mime, "text/csv");

    let lines = csv_lines(&download.contents);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Name,Hash,Id,Tag,Tier,Type,Source,Power,Category,Element,"));
    assert!(lines[0].ends_with("Notes,Perks 0,Perks 1,Perks 2"));
    assert!(lines[1].starts_with(
        "Mountaintop,3260753130,\"\"\"6917529100000000001\"\"\",favorite,Legendary,Grenade Launcher,crucible,1060,Energy,Kinetic,Blast Radius,10,Titan(1050),"
    ));
    assert!(lines[1].ends_with("pvp god roll,Quick Launch*,Volatile Launch,Micro-Missile*"));
    assert!(lines[2].contains(",dreaming,"));
    assert!(lines[2].contains(",Vault,"));
}

#[test]
fn armor_export_rows_carry_stats_and_base_values() {
    let session = fixture_session();
    let items = session
        .items_for_export(ExportKind::Armor)
        .expect("stores are loaded");
    let owners = session.owner_names();
    let ctx = RowContext {
        annotations: session.item_infos(),
        owner_names: &owners,
        ratings: &NoRatings,
        options: ExportOptions::default(),
    };
    let rows = armor_rows(&items, &ctx);
    assert_eq!(rows.len(), 3);

    let helmet = &rows[0];
    assert_eq!(helmet.get("Tag"), Some(&Cell::from("keep")));
    assert_eq!(helmet.get("Equippable"), Some(&Cell::from("Titan")));
    assert_eq!(helmet.get("Armor2.0"), Some(&Cell::Bool(true)));
    assert_eq!(helmet.get("Masterwork Tier"), Some(&Cell::Empty));
    assert_eq!(helmet.get("Resilience"), Some(&Cell::Int(20)));
    assert_eq!(helmet.get("Total"), Some(&Cell::Int(70)));
    assert_eq!(helmet.get("Total (Base)"), Some(&Cell::Int(58)));
    assert_eq!(helmet.get("Seasonal Mod"), Some(&Cell::from("Undying")));
    assert_eq!(helmet.get("Event"), Some(&Cell::from("Festival of the Lost")));
    // Season 12 is newer than the season table.
    assert_eq!(helmet.get("Year"), Some(&Cell::Empty));
    assert_eq!(helmet.get("Notes"), Some(&Cell::from("")));

    let class_item = &rows[1];
    assert_eq!(class_item.get("Equippable"), Some(&Cell::from("Hunter")));
    assert_eq!(class_item.get("Armor2.0"), Some(&Cell::Bool(false)));
    assert!(class_item.get("Seasonal Mod").is_none());

    assert_eq!(
        headers(helmet)[..5],
        ["Name", "Hash", "Id", "Tag", "Tier"]
    );
}

#[test]
fn ghost_export_has_minimal_columns() {
    let session = fixture_session();
    let download = download_csv_files(
        &session,
        ExportKind::Ghost,
        ExportOptions::default(),
        &NoRatings,
    )
    .expect("export should succeed");

    assert_eq!(download.filename, "destinyGhosts.csv");
    let lines = csv_lines(&download.contents);
    assert_eq!(
        lines,
        vec![
            "Name,Hash,Id,Tag,Tier,Source,Owner,Locked,Equipped,Notes",
            "Wild Hunt Shell,3190250541,\"\"\"6917529100000000004\"\"\",,Legendary,,Titan(1050),true,true,",
        ]
    );
}

#[test]
fn export_without_stores_fails() {
    let session = Engine::new()
        .open_bytes(br#"{"stores": []}"#)
        .expect("empty profile should parse");
    let err = download_csv_files(
        &session,
        ExportKind::Armor,
        ExportOptions::default(),
        &NoRatings,
    )
    .expect_err("nothing to export");
    assert_eq!(err.code, CoreErrorCode::NoStores);
}
