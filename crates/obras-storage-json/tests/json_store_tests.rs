use std::fs;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use tempfile::tempdir;

use obras_core::{ObraStore, Snapshot};
use obras_domain::{AnoteInput, ObraInput};
use obras_storage_json::{load_snapshot_from_path, JsonObraStore};

fn stamp(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, day, 14, 30, 0).unwrap()
}

#[test]
fn json_store_persists_every_mutation() {
    let dir = tempdir().expect("tempdir");
    let store = JsonObraStore::open(dir.path()).expect("open store");

    let obra = store
        .insert_obra(ObraInput::new("Casa Quispe", Decimal::new(250000, 2)))
        .expect("insert obra");
    store
        .insert_anote(obra.id, AnoteInput::new("Ladrillo", Decimal::new(45050, 2)), stamp(6))
        .expect("insert anote");

    let on_disk = load_snapshot_from_path(store.data_path()).expect("read data file");
    assert_eq!(on_disk.obras.len(), 1);
    assert_eq!(on_disk.anotes.len(), 1);
    assert_eq!(on_disk.anotes[0].amount, Decimal::new(45050, 2));
    assert_eq!(on_disk.next_anote_id, 2);

    let raw = fs::read_to_string(store.data_path()).expect("raw json");
    assert!(raw.contains("\"id_Obra\""));
    assert!(raw.contains("\"razon\": \"Ladrillo\""));
}

#[test]
fn json_store_reloads_state_and_counters() {
    let dir = tempdir().expect("tempdir");
    {
        let store = JsonObraStore::open(dir.path()).expect("open store");
        let first = store
            .insert_obra(ObraInput::new("Primera", Decimal::ONE))
            .expect("insert");
        store.insert_obra(ObraInput::new("Segunda", Decimal::ONE)).expect("insert");
        store.delete_obra(first.id).expect("delete");
    }

    let reopened = JsonObraStore::open(dir.path()).expect("reopen store");
    let obras = reopened.list_obras().expect("list");
    assert_eq!(obras.len(), 1);
    assert_eq!(obras[0].name, "Segunda");

    let third = reopened
        .insert_obra(ObraInput::new("Tercera", Decimal::ONE))
        .expect("insert");
    assert_eq!(third.id, 3);
}

#[test]
fn json_store_backs_up_previous_file_before_overwrite() {
    let dir = tempdir().expect("tempdir");
    let store = JsonObraStore::open(dir.path()).expect("open store");
    assert!(store.list_backups().expect("list").is_empty());

    store.insert_obra(ObraInput::new("A", Decimal::ONE)).expect("insert");
    assert!(store.list_backups().expect("list").is_empty());

    store.insert_obra(ObraInput::new("B", Decimal::ONE)).expect("insert");
    let backups = store.list_backups().expect("list");
    assert_eq!(backups.len(), 1);
    assert!(backups[0].name.starts_with("obras_auto_"));
    assert!(backups[0].automatic);
    assert!(backups[0].created_at.is_some());

    let copy = load_snapshot_from_path(&backups[0].path).expect("read auto copy");
    assert_eq!(copy.obras.len(), 1);
}

#[test]
fn explicit_backup_restores_earlier_state() {
    let dir = tempdir().expect("tempdir");
    let store = JsonObraStore::open(dir.path()).expect("open store");
    let obra = store
        .insert_obra(ObraInput::new("Galpon", Decimal::new(900, 0)))
        .expect("insert");

    let info = store.backup(Some("antes de borrar")).expect("backup");
    assert!(info.name.ends_with("_antes-de-borrar.json"));
    assert!(info.size_bytes > 0);

    store.delete_obra(obra.id).expect("delete");
    assert!(store.list_obras().expect("list").is_empty());

    let restored = store.restore_backup(&info.name).expect("restore");
    assert_eq!(restored.obras.len(), 1);
    assert_eq!(store.get_obra(obra.id).expect("get").map(|o| o.name), Some("Galpon".into()));

    let on_disk = load_snapshot_from_path(store.data_path()).expect("read data file");
    assert_eq!(on_disk.obras.len(), 1);
}

#[test]
fn restore_rejects_unknown_or_unsafe_names() {
    let dir = tempdir().expect("tempdir");
    let store = JsonObraStore::open(dir.path()).expect("open store");
    assert!(store.restore_backup("obras_20240101_0000.json").is_err());
    assert!(store.restore_backup("../obras.json").is_err());
}

#[test]
fn retention_prunes_only_automatic_copies() {
    let dir = tempdir().expect("tempdir");
    let store = JsonObraStore::open_with_retention(dir.path(), 1).expect("open store");
    for note in ["uno", "dos", "tres"] {
        store.backup(Some(note)).expect("backup");
    }
    let keep = store.backup(Some("cierre")).expect("backup");

    // Auto copies from the same second share a name, so spread the writes
    // over distinct seconds to make pruning observable.
    store.insert_obra(ObraInput::new("A", Decimal::ONE)).expect("insert");
    store.insert_obra(ObraInput::new("B", Decimal::ONE)).expect("insert");
    std::thread::sleep(std::time::Duration::from_millis(1100));
    store.insert_obra(ObraInput::new("C", Decimal::ONE)).expect("insert");

    let backups = store.list_backups().expect("list");
    let automatic = backups.iter().filter(|backup| backup.automatic).count();
    let explicit: Vec<_> = backups
        .iter()
        .filter(|backup| !backup.automatic)
        .map(|backup| backup.name.as_str())
        .collect();
    assert_eq!(automatic, 1);
    assert_eq!(explicit.len(), 4);
    assert!(explicit.contains(&keep.name.as_str()));
}

#[test]
fn explicit_backup_is_not_overwritten_by_later_writes() {
    let dir = tempdir().expect("tempdir");
    let store = JsonObraStore::open(dir.path()).expect("open store");
    store.insert_obra(ObraInput::new("A", Decimal::ONE)).expect("insert");

    let first = store.backup(None).expect("backup");
    let second = store.backup(None).expect("backup");
    assert_ne!(first.name, second.name);
    assert!(!first.automatic);

    store.insert_obra(ObraInput::new("B", Decimal::ONE)).expect("insert");
    store.insert_obra(ObraInput::new("C", Decimal::ONE)).expect("insert");

    let saved = load_snapshot_from_path(&first.path).expect("read backup");
    assert_eq!(saved.obras.len(), 1);

    let restored = store.restore_backup(&first.name).expect("restore");
    assert_eq!(restored.obras.len(), 1);
    assert_eq!(store.list_obras().expect("list").len(), 1);
}

#[test]
fn amounts_survive_reload_exactly() {
    let dir = tempdir().expect("tempdir");
    let budget: Decimal = "999999999999.123456789".parse().expect("budget");
    let spent: Decimal = "0.123456789012345678".parse().expect("amount");
    {
        let store = JsonObraStore::open(dir.path()).expect("open store");
        let obra = store
            .insert_obra(ObraInput::new("Puente", budget))
            .expect("insert obra");
        store
            .insert_anote(obra.id, AnoteInput::new("Pernos", spent), stamp(7))
            .expect("insert anote");
    }

    let reopened = JsonObraStore::open(dir.path()).expect("reopen store");
    let obra = reopened.get_obra(1).expect("get").expect("obra");
    assert_eq!(obra.budget, budget);
    let anotes = reopened.list_anotes(obra.id).expect("list");
    assert_eq!(anotes[0].amount, spent);

    let raw = fs::read_to_string(reopened.data_path()).expect("raw json");
    assert!(raw.contains("\"gasto\": \"0.123456789012345678\""));
}

#[test]
fn float_amounts_from_older_files_load_and_upgrade() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("obras.json"),
        r#"{"schema_version": 1, "next_obra_id": 2, "next_anote_id": 1,
            "obras": [{"id_Obra": 1, "nombre": "Casa", "costo": 1500.5}], "anotes": []}"#,
    )
    .expect("write");

    let store = JsonObraStore::open(dir.path()).expect("open store");
    let snapshot = store.snapshot().expect("snapshot");
    assert_eq!(snapshot.schema_version, obras_core::CURRENT_SCHEMA_VERSION);
    assert_eq!(snapshot.obras[0].budget, Decimal::new(15005, 1));
}

#[test]
fn open_repairs_stale_counters_in_existing_file() {
    let dir = tempdir().expect("tempdir");
    let mut snapshot = Snapshot::default();
    snapshot.insert_obra(ObraInput::new("Vieja", Decimal::ONE));
    snapshot.next_obra_id = 1;
    fs::write(
        dir.path().join("obras.json"),
        serde_json::to_string(&snapshot).expect("serialize"),
    )
    .expect("write");

    let store = JsonObraStore::open(dir.path()).expect("open store");
    let created = store
        .insert_obra(ObraInput::new("Nueva", Decimal::ONE))
        .expect("insert");
    assert_eq!(created.id, 2);
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("obras.json"), "{ not json").expect("write");
    let err = JsonObraStore::open(dir.path()).expect_err("corrupt file");
    assert!(err.to_string().starts_with("Serialization error"));
}
