use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use obras_core::{
    storage::integrity_warnings, CoreError, ObraStore, Snapshot, CURRENT_SCHEMA_VERSION,
};
use obras_domain::{Anote, AnoteInput, Obra, ObraInput, RowId};

const DATA_FILE_STEM: &str = "obras";
const DATA_EXTENSION: &str = "json";
const BACKUP_DIR_NAME: &str = "backups";
const AUTO_BACKUP_TAG: &str = "auto";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// File-backed [`ObraStore`] keeping the whole table state in one JSON document.
///
/// Every mutation is written through before the call returns. The previous
/// document is copied into the backups directory first as an automatic
/// `obras_auto_*` backup, and automatic copies are pruned down to the
/// retention limit. Backups taken with [`JsonObraStore::backup`] are never
/// pruned or overwritten.
#[derive(Debug)]
pub struct JsonObraStore {
    state: Mutex<Snapshot>,
    data_path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// A backup file found in the backups directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    /// Copy taken before a write rather than on request.
    pub automatic: bool,
}

impl JsonObraStore {
    pub fn open(data_dir: &Path) -> Result<Self, CoreError> {
        Self::open_with_retention(data_dir, DEFAULT_RETENTION)
    }

    pub fn open_with_retention(data_dir: &Path, retention: usize) -> Result<Self, CoreError> {
        let backups_dir = data_dir.join(BACKUP_DIR_NAME);
        fs::create_dir_all(data_dir)?;
        fs::create_dir_all(&backups_dir)?;
        let data_path = data_dir.join(format!("{DATA_FILE_STEM}.{DATA_EXTENSION}"));

        let snapshot = if data_path.exists() {
            let mut snapshot = load_snapshot_from_path(&data_path)?;
            for warning in integrity_warnings(&snapshot) {
                warn!(path = %data_path.display(), "{warning}");
            }
            snapshot.repair_counters();
            if snapshot.schema_version < CURRENT_SCHEMA_VERSION {
                info!(
                    from = snapshot.schema_version,
                    to = CURRENT_SCHEMA_VERSION,
                    "upgrading obras data schema"
                );
                snapshot.schema_version = CURRENT_SCHEMA_VERSION;
            }
            info!(
                path = %data_path.display(),
                obras = snapshot.obras.len(),
                anotes = snapshot.anotes.len(),
                "loaded obras data"
            );
            snapshot
        } else {
            info!(path = %data_path.display(), "no data file yet, starting empty");
            Snapshot::default()
        };

        Ok(Self {
            state: Mutex::new(snapshot),
            data_path,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn snapshot(&self) -> Result<Snapshot, CoreError> {
        Ok(self.lock()?.clone())
    }

    /// Writes the current state to a new backup file, optionally tagged with `note`.
    ///
    /// The name never collides with an existing backup; a `_2`, `_3`, ...
    /// suffix is added when two backups land in the same second.
    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        let snapshot = self.snapshot()?;
        let mut stem = format!("{}_{}", DATA_FILE_STEM, backup_timestamp());
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        fs::create_dir_all(&self.backups_dir)?;
        let file_name = self.unused_backup_name(&stem);
        let path = self.backups_dir.join(&file_name);
        write_atomic(&path, &serialize_snapshot(&snapshot)?)?;
        info!(backup = %file_name, "created backup");
        Ok(backup_info(file_name, path))
    }

    /// Backups newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(DATA_EXTENSION)
            {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(backup_info(file_name.to_string(), path.clone()));
            }
        }
        entries.sort_by(|a, b| {
            Reverse(a.created_at)
                .cmp(&Reverse(b.created_at))
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }

    /// Replaces the current state with the contents of backup `name`.
    ///
    /// The data file being replaced is itself backed up first.
    pub fn restore_backup(&self, name: &str) -> Result<Snapshot, CoreError> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(CoreError::Storage(format!("invalid backup name `{name}`")));
        }
        let path = self.backups_dir.join(name);
        if !path.is_file() {
            return Err(CoreError::Storage(format!("backup `{name}` not found")));
        }
        let mut restored = load_snapshot_from_path(&path)?;
        for warning in integrity_warnings(&restored) {
            warn!(backup = %name, "{warning}");
        }
        restored.repair_counters();

        let mut guard = self.lock()?;
        self.persist(&restored)?;
        *guard = restored.clone();
        info!(backup = %name, "restored backup");
        Ok(restored)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("json store lock poisoned".into()))
    }

    /// Applies `change` to a working copy and commits it only once it is on disk.
    fn mutate<T>(&self, change: impl FnOnce(&mut Snapshot) -> T) -> Result<T, CoreError> {
        let mut guard = self.lock()?;
        let mut working = guard.clone();
        let outcome = change(&mut working);
        if working != *guard {
            self.persist(&working)?;
            *guard = working;
        }
        Ok(outcome)
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), CoreError> {
        if self.data_path.exists() {
            self.backup_existing_file()?;
        }
        let tmp = tmp_path(&self.data_path);
        write_atomic(&tmp, &serialize_snapshot(snapshot)?)?;
        fs::rename(&tmp, &self.data_path)?;
        debug!(path = %self.data_path.display(), "saved obras data");
        Ok(())
    }

    fn unused_backup_name(&self, stem: &str) -> String {
        let mut file_name = format!("{stem}.{DATA_EXTENSION}");
        let mut attempt = 1;
        while self.backups_dir.join(&file_name).exists() {
            attempt += 1;
            file_name = format!("{stem}_{attempt}.{DATA_EXTENSION}");
        }
        file_name
    }

    /// Copies the current data file to `obras_auto_<timestamp>.json`.
    ///
    /// A copy from the same second is replaced; it held an older state of the
    /// same file.
    fn backup_existing_file(&self) -> Result<(), CoreError> {
        fs::create_dir_all(&self.backups_dir)?;
        let file_name = format!(
            "{DATA_FILE_STEM}_{AUTO_BACKUP_TAG}_{}.{DATA_EXTENSION}",
            backup_timestamp()
        );
        fs::copy(&self.data_path, self.backups_dir.join(file_name))?;
        self.prune_automatic_backups()
    }

    fn prune_automatic_backups(&self) -> Result<(), CoreError> {
        let automatic = self
            .list_backups()?
            .into_iter()
            .filter(|entry| entry.automatic);
        for entry in automatic.skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.name, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl ObraStore for JsonObraStore {
    fn list_obras(&self) -> Result<Vec<Obra>, CoreError> {
        Ok(self.lock()?.list_obras())
    }

    fn get_obra(&self, id: RowId) -> Result<Option<Obra>, CoreError> {
        Ok(self.lock()?.get_obra(id))
    }

    fn insert_obra(&self, input: ObraInput) -> Result<Obra, CoreError> {
        self.mutate(|snapshot| snapshot.insert_obra(input))
    }

    fn update_obra(&self, id: RowId, input: ObraInput) -> Result<Option<Obra>, CoreError> {
        self.mutate(|snapshot| snapshot.update_obra(id, input))
    }

    fn delete_obra(&self, id: RowId) -> Result<bool, CoreError> {
        self.mutate(|snapshot| snapshot.delete_obra(id))
    }

    fn list_anotes(&self, obra_id: RowId) -> Result<Vec<Anote>, CoreError> {
        Ok(self.lock()?.list_anotes(obra_id))
    }

    fn get_anote(&self, id: RowId) -> Result<Option<Anote>, CoreError> {
        Ok(self.lock()?.get_anote(id))
    }

    fn insert_anote(
        &self,
        obra_id: RowId,
        input: AnoteInput,
        timestamp: DateTime<Utc>,
    ) -> Result<Anote, CoreError> {
        self.mutate(|snapshot| snapshot.insert_anote(obra_id, input, timestamp))
    }

    fn update_anote(&self, id: RowId, input: AnoteInput) -> Result<Option<Anote>, CoreError> {
        self.mutate(|snapshot| snapshot.update_anote(id, input))
    }

    fn delete_anote(&self, id: RowId) -> Result<bool, CoreError> {
        self.mutate(|snapshot| snapshot.delete_anote(id))
    }

    fn delete_anotes_for_obra(&self, obra_id: RowId) -> Result<usize, CoreError> {
        self.mutate(|snapshot| snapshot.delete_anotes_for_obra(obra_id))
    }
}

/// Loads a snapshot document from an arbitrary path.
pub fn load_snapshot_from_path(path: &Path) -> Result<Snapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn serialize_snapshot(snapshot: &Snapshot) -> Result<String, CoreError> {
    serde_json::to_string_pretty(snapshot).map_err(|err| CoreError::Serde(err.to_string()))
}

fn backup_info(name: String, path: PathBuf) -> BackupInfo {
    let size_bytes = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
    BackupInfo {
        created_at: parse_backup_timestamp(&name),
        automatic: is_automatic_backup(&name),
        name,
        path,
        size_bytes,
    }
}

fn is_automatic_backup(name: &str) -> bool {
    name.starts_with(&format!("{DATA_FILE_STEM}_{AUTO_BACKUP_TAG}_"))
}

fn backup_timestamp() -> String {
    Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string()
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads the timestamp of `obras_[auto_]YYYYMMDD_HHMMSS[_note].json`.
///
/// Names with minute precision (`HHMM`) from older installs are accepted too.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{DATA_EXTENSION}"))?;
    let rest = stem.strip_prefix(&format!("{DATA_FILE_STEM}_"))?;
    let rest = rest
        .strip_prefix(&format!("{AUTO_BACKUP_TAG}_"))
        .unwrap_or(rest);
    let mut segments = rest.split('_');
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) {
        return None;
    }
    let time = match time.len() {
        6 if is_digits(time, 6) => time.to_string(),
        4 if is_digits(time, 4) => format!("{time}00"),
        _ => return None,
    };
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_become_dashed_slugs() {
        assert_eq!(
            sanitize_backup_note(Some("  Antes de Cierre!! ")),
            Some("antes-de-cierre".into())
        );
        assert_eq!(sanitize_backup_note(Some("___")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn backup_names_carry_their_timestamp() {
        let stamp = parse_backup_timestamp("obras_20240807_153012_antes-de-cierre.json")
            .expect("timestamp");
        assert_eq!(stamp.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-08-07 15:30:12");

        let auto = parse_backup_timestamp("obras_auto_20240807_153012.json").expect("auto");
        assert_eq!(auto, stamp);

        let legacy = parse_backup_timestamp("obras_20240807_1530.json").expect("legacy");
        assert_eq!(legacy.format("%H:%M:%S").to_string(), "15:30:00");

        assert!(parse_backup_timestamp("obras_latest.json").is_none());
        assert!(parse_backup_timestamp("obras_20240807_15301.json").is_none());
        assert!(parse_backup_timestamp("notes.txt").is_none());
    }

    #[test]
    fn only_auto_prefixed_names_are_automatic() {
        assert!(is_automatic_backup("obras_auto_20240807_153012.json"));
        assert!(!is_automatic_backup("obras_20240807_153012_auto.json"));
        assert!(!is_automatic_backup("obras_20240807_153012.json"));
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let tmp = tmp_path(Path::new("/data/obras.json"));
        assert_eq!(tmp, PathBuf::from("/data/obras.json.tmp"));
    }
}
