use std::collections::HashMap;
use std::path::PathBuf;

use obras_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_has_bolivian_formatting() {
    let cfg = Config::default();

    assert_eq!(cfg.currency_symbol, "Bs");
    assert_eq!(cfg.decimal_separator, ',');
    assert_eq!(cfg.grouping_separator, '.');
    assert_eq!(cfg.log_filter, "obras=info");
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let cfg = Config {
        port: 8081,
        utc_offset_minutes: -240,
        data_dir: Some(PathBuf::from("/srv/obras")),
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(
        loaded.resolve_data_dir(dir.path()),
        PathBuf::from("/srv/obras")
    );
}

#[test]
fn missing_config_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");

    assert_eq!(manager.load().expect("load"), Config::default());
    assert_eq!(
        manager.config_path(),
        dir.path().join("config").join("config.json")
    );
    assert_eq!(
        Config::default().resolve_data_dir(dir.path()),
        dir.path().join("data")
    );
}

#[test]
fn config_backups_round_trip_through_restore() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");

    manager
        .update(|cfg| cfg.set_value("currency_symbol", "USD"))
        .expect("update");
    let backup = manager.backup(Some("Antes del cambio")).expect("backup");
    assert!(backup.name.starts_with("config_"));
    assert!(backup.name.ends_with("_antes-del-cambio.json"));
    assert!(backup.created_at.is_some());

    let again = manager.backup(Some("Antes del cambio")).expect("second backup");
    assert_ne!(again.name, backup.name);

    manager.save(&Config::default()).expect("save");
    let restored = manager.restore(&backup.name).expect("restore");
    assert_eq!(restored.currency_symbol, "USD");
    assert_eq!(manager.load().expect("load").currency_symbol, "USD");

    let names: Vec<String> = manager
        .list_backups()
        .expect("list")
        .into_iter()
        .map(|backup| backup.name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&backup.name));
}

#[test]
fn restore_of_unknown_or_unsafe_backup_fails() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
    assert!(matches!(
        manager.restore("config_20240101_000000.json"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        manager.restore("../config.json"),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn failed_update_leaves_the_file_alone() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
    manager
        .update(|cfg| cfg.set_value("port", "8081"))
        .expect("update");

    let result = manager.update(|cfg| cfg.set_value("grouping_separator", ","));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));

    let saved = manager.load().expect("load");
    assert_eq!(saved.port, 8081);
    assert_eq!(saved.grouping_separator, '.');
}

#[test]
fn env_overrides_replace_host_port_and_offset() {
    let vars: HashMap<&str, &str> = [
        ("OBRAS_HOST", "0.0.0.0"),
        ("OBRAS_PORT", "9090"),
        ("OBRAS_UTC_OFFSET_MINUTES", "-240"),
    ]
    .into_iter()
    .collect();

    let mut cfg = Config::default();
    cfg.apply_overrides_from(|key| vars.get(key).map(|value| value.to_string()))
        .expect("overrides");

    assert_eq!(cfg.bind_address(), "0.0.0.0:9090");
    assert_eq!(cfg.utc_offset().expect("offset").local_minus_utc(), -14_400);
}

#[test]
fn invalid_overrides_are_rejected() {
    let mut cfg = Config::default();
    let port = cfg.apply_overrides_from(|key| (key == "OBRAS_PORT").then(|| "abc".to_string()));
    assert!(matches!(port, Err(ConfigError::Invalid(_))));

    let mut cfg = Config::default();
    let offset = cfg.apply_overrides_from(|key| {
        (key == "OBRAS_UTC_OFFSET_MINUTES").then(|| "2000".to_string())
    });
    assert!(matches!(offset, Err(ConfigError::Invalid(_))));
}

#[test]
fn identical_separators_fail_validation() {
    let cfg = Config {
        grouping_separator: ',',
        ..Config::default()
    };
    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
}
