use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "config_";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A saved copy of the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackup {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Reads, edits and snapshots the settings file under the application home.
///
/// Environment overrides are never written back: every write starts from the
/// file contents, not from the effective settings.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Lays out `<base>/config/config.json` and `<base>/config/backups/`.
    pub fn with_base_dir(base: &Path) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(
            config_dir.join(CONFIG_FILE),
            config_dir.join("backups"),
        ))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the saved settings, or the defaults when nothing was saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        let config = read_config(&self.config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates `config` and replaces the settings file with it.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        write_replacing(&self.config_path, &to_json(config)?)
    }

    /// Applies `change` to the saved settings and writes the result back.
    ///
    /// Nothing is written when `change` fails or leaves an invalid config.
    pub fn update<F>(&self, change: F) -> Result<Config, ConfigError>
    where
        F: FnOnce(&mut Config) -> Result<(), ConfigError>,
    {
        let mut config = self.load()?;
        change(&mut config)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Copies the saved settings to `config_<timestamp>[_note].json`.
    pub fn backup(&self, note: Option<&str>) -> Result<ConfigBackup, ConfigError> {
        let config = self.load()?;
        fs::create_dir_all(&self.backups_dir)?;

        let mut stem = format!(
            "{BACKUP_PREFIX}{}",
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(slug) = note.and_then(slugify) {
            stem = format!("{stem}_{slug}");
        }
        let mut name = format!("{stem}.{BACKUP_EXTENSION}");
        let mut attempt = 1;
        while self.backups_dir.join(&name).exists() {
            attempt += 1;
            name = format!("{stem}_{attempt}.{BACKUP_EXTENSION}");
        }

        write_replacing(&self.backups_dir.join(&name), &to_json(&config)?)?;
        Ok(ConfigBackup {
            created_at: backup_timestamp(&name),
            name,
        })
    }

    /// Makes backup `name` the saved settings and returns them.
    pub fn restore(&self, name: &str) -> Result<Config, ConfigError> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "`{name}` is not a configuration backup name"
            )));
        }
        let path = self.backups_dir.join(name);
        if !path.is_file() {
            return Err(ConfigError::Invalid(format!(
                "configuration backup `{name}` not found"
            )));
        }
        let config = read_config(&path)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Settings backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<ConfigBackup>, ConfigError> {
        if !self.backups_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXTENSION) {
                backups.push(ConfigBackup {
                    created_at: backup_timestamp(&name),
                    name,
                });
            }
        }
        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(backups)
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn to_json(config: &Config) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))
}

/// Lowercase ASCII words joined by single dashes; `None` when nothing is left.
fn slugify(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("-"))
}

fn backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.get(..15)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Writes `data` next to `path` and renames it into place.
fn write_replacing(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_slugify_to_dashed_words() {
        assert_eq!(slugify(" Antes del cambio! "), Some("antes-del-cambio".into()));
        assert_eq!(slugify("--"), None);
    }

    #[test]
    fn timestamps_come_from_the_name() {
        let stamp = backup_timestamp("config_20240807_153012_nota.json").expect("stamp");
        assert_eq!(stamp.format("%d/%m/%Y %H:%M:%S").to_string(), "07/08/2024 15:30:12");
        assert!(backup_timestamp("config_latest.json").is_none());
    }
}
