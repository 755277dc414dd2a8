use std::fs;
use std::path::PathBuf;

use vault_core::core_api::{
    AnnotationLookup, CoreErrorCode, DestinyVersion, Engine, ExportKind, Session, TagValue,
};
use vault_core::destiny_class::DestinyClass;
use vault_core::routes::{Flavor, default_account_route};
use vault_core::spreadsheet::ImportFile;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_session() -> Session {
    let path = workspace_root().join("tests/fixtures/profile.json");
    let bytes = fs::read(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e));
    Engine::new()
        .open_bytes(&bytes)
        .unwrap_or_else(|e| panic!("failed to open {:?}: {}", path, e))
}

#[test]
fn engine_opens_profile_fixture() {
    let session = fixture_session();

    assert_eq!(session.stores().len(), 2);
    assert_eq!(session.items().count(), 6);
    assert_eq!(session.item_infos().len(), 3);

    let titan = session
        .store("2305843009260000001")
        .expect("character store exists");
    assert_eq!(titan.class_type, DestinyClass::Titan);
    assert!(!titan.is_vault());
    assert!(session.store("vault").expect("vault exists").is_vault());
}

#[test]
fn unknown_store_is_reported() {
    let session = fixture_session();
    let err = session.store("nope").expect_err("store does not exist");
    assert_eq!(err.code, CoreErrorCode::UnknownStore);
}

#[test]
fn invalid_profile_is_parse_error() {
    let err = Engine::new()
        .open_bytes(b"{ not json")
        .expect_err("garbage must not parse");
    assert_eq!(err.code, CoreErrorCode::Parse);

    let err = Engine::new()
        .open_bytes(br#"{"stores":[{"id":"vault","items":[{"destiny_version":3}]}]}"#)
        .expect_err("only D1 and D2 exist");
    assert_eq!(err.code, CoreErrorCode::Parse);
}

#[test]
fn owner_names_label_vault_and_characters() {
    let session = fixture_session();
    let names = session.owner_names();
    assert_eq!(names["vault"], "Vault");
    assert_eq!(names["2305843009260000001"], "Titan(1050)");
}

#[test]
fn export_selection_by_kind() {
    let session = fixture_session();
    let ids = |kind| -> Vec<String> {
        session
            .items_for_export(kind)
            .expect("stores are loaded")
            .into_iter()
            .map(|item| item.id.clone())
            .collect()
    };

    assert_eq!(
        ids(ExportKind::Weapons),
        vec!["6917529100000000001", "6917529100000000005"]
    );
    assert_eq!(
        ids(ExportKind::Armor),
        vec![
            "6917529100000000002",
            "6917529100000000003",
            "6917529100000000006"
        ]
    );
    assert_eq!(ids(ExportKind::Ghost), vec!["6917529100000000004"]);
}

#[test]
fn export_kind_parses_loosely() {
    assert_eq!("Weapons".parse::<ExportKind>(), Ok(ExportKind::Weapons));
    assert_eq!("armour".parse::<ExportKind>(), Ok(ExportKind::Armor));
    assert_eq!("ghosts".parse::<ExportKind>(), Ok(ExportKind::Ghost));
    assert!("shaders".parse::<ExportKind>().is_err());
    assert_eq!(ExportKind::Ghost.filename_stem(), "destinyGhosts");
}

#[test]
fn active_account_defaults_to_first_and_can_switch() {
    let mut session = fixture_session();
    let active = session.active_account().expect("accounts are loaded");
    assert_eq!(active.destiny_version, DestinyVersion::Destiny2);
    assert_eq!(active.platform_label(), "Steam");

    let route = default_account_route(session.active_account()).expect("account is active");
    assert_eq!(
        route.url(Flavor::Release).as_deref(),
        Some("/4611686018467284386/d2/inventory")
    );

    session
        .accounts_mut()
        .select("4611686018467284386", DestinyVersion::Destiny1)
        .expect("D1 account exists");
    let active = session.active_account().expect("accounts are loaded");
    assert_eq!(active.version_label(), "D1");
    assert_eq!(active.platform_label(), "PlayStation");

    let err = session
        .accounts_mut()
        .select("1", DestinyVersion::Destiny2)
        .expect_err("unknown membership id");
    assert_eq!(err.code, CoreErrorCode::UnknownAccount);
    assert_eq!(
        session.active_account().map(|a| a.version_label()),
        Some("D1")
    );
}

#[test]
fn import_updates_session_and_survives_reload() {
    let mut session = fixture_session();
    let csv = "Id,Hash,Tag,Notes\n6917529100000000001,3260753130,junk,\n6917529100000000006,1331482397,keep,infuse later\n";

    let count = session
        .import_tags_notes(&[ImportFile::new("weapons.csv", csv)])
        .expect("import should succeed");
    assert_eq!(count, Some(2));

    let bytes = session.to_json_bytes().expect("profile serializes");
    let reloaded = Engine::new().open_bytes(bytes).expect("profile reloads");
    let infos = reloaded.item_infos();
    assert_eq!(infos.tag("6917529100000000001"), Some(TagValue::Junk));
    assert_eq!(infos.notes("6917529100000000001"), None);
    assert_eq!(infos.tag("6917529100000000006"), Some(TagValue::Keep));
    assert_eq!(infos.notes("6917529100000000006"), Some("infuse later"));
    assert_eq!(reloaded.accounts(), session.accounts());
}

#[test]
fn import_without_accounts_does_nothing() {
    let mut session = Engine::new()
        .open_bytes(br#"{"stores":[{"id":"vault"}]}"#)
        .expect("minimal profile parses");
    let count = session
        .import_tags_notes(&[ImportFile::new("a.csv", "Id,Hash,Tag,Notes\n1,2,keep,\n")])
        .expect("no account is not an error");
    assert_eq!(count, None);
    assert!(session.item_infos().is_empty());
}
