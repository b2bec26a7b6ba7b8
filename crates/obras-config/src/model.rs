use std::{env, path::PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const ENV_HOST: &str = "OBRAS_HOST";
pub const ENV_PORT: &str = "OBRAS_PORT";
pub const ENV_UTC_OFFSET: &str = "OBRAS_UTC_OFFSET_MINUTES";
pub const ENV_HOME: &str = "OBRAS_HOME";

/// Keys accepted by [`Config::set_value`].
pub const SETTABLE_KEYS: &[&str] = &[
    "host",
    "port",
    "data_dir",
    "utc_offset_minutes",
    "currency_symbol",
    "decimal_separator",
    "grouping_separator",
    "backup_retention",
    "log_filter",
    "ui_color_enabled",
];

/// Largest offset any real time zone uses, in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Application home: `$OBRAS_HOME` when set, otherwise `~/.obras`.
pub fn home_dir() -> PathBuf {
    if let Some(custom) = env::var_os(ENV_HOME).filter(|value| !value.is_empty()) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".obras")
}

/// Server and presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: String,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding `obras.json` and its backups. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,
    /// Offset of the local calendar used to cut weeks, e.g. `-240` for UTC-4.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_decimal_separator")]
    pub decimal_separator: char,
    #[serde(default = "Config::default_grouping_separator")]
    pub grouping_separator: char,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            data_dir: None,
            utc_offset_minutes: 0,
            currency_symbol: Self::default_currency_symbol(),
            decimal_separator: Self::default_decimal_separator(),
            grouping_separator: Self::default_grouping_separator(),
            backup_retention: Self::default_backup_retention(),
            log_filter: Self::default_log_filter(),
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_host() -> String {
        "127.0.0.1".into()
    }

    pub fn default_port() -> u16 {
        3000
    }

    pub fn default_currency_symbol() -> String {
        "Bs".into()
    }

    pub fn default_decimal_separator() -> char {
        ','
    }

    pub fn default_grouping_separator() -> char {
        '.'
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_log_filter() -> String {
        "obras=info".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_data_dir(&self, home: &std::path::Path) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => home.join("data"),
        }
    }

    /// `host:port` suitable for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "utc_offset_minutes {} is out of range",
                self.utc_offset_minutes
            ))
        })
    }

    /// Applies `OBRAS_HOST`, `OBRAS_PORT` and `OBRAS_UTC_OFFSET_MINUTES` from the
    /// process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST).filter(|value| !value.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{ENV_PORT}=`{port}` is not a port")))?;
        }
        if let Some(offset) = lookup(ENV_UTC_OFFSET) {
            self.utc_offset_minutes = offset.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_UTC_OFFSET}=`{offset}` is not a number"))
            })?;
        }
        self.validate()
    }

    /// Sets one setting from its textual form, as typed on the command line.
    ///
    /// `data_dir` accepts `default` to go back to `<home>/data`. The config is
    /// left untouched when the new value does not validate.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let previous = self.clone();
        let value = value.trim();
        let invalid = |expected: &str| {
            ConfigError::Invalid(format!("{key}: `{value}` is not {expected}"))
        };
        match key {
            "host" => self.host = value.to_string(),
            "port" => self.port = value.parse().map_err(|_| invalid("a port"))?,
            "data_dir" => {
                self.data_dir = match value {
                    "" | "default" => None,
                    path => Some(PathBuf::from(path)),
                }
            }
            "utc_offset_minutes" => {
                self.utc_offset_minutes = value.parse().map_err(|_| invalid("a number"))?
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "decimal_separator" => {
                self.decimal_separator =
                    single_char(value).ok_or_else(|| invalid("one character"))?
            }
            "grouping_separator" => {
                self.grouping_separator =
                    single_char(value).ok_or_else(|| invalid("one character"))?
            }
            "backup_retention" => {
                self.backup_retention = value
                    .parse()
                    .ok()
                    .filter(|count| *count > 0)
                    .ok_or_else(|| invalid("a positive count"))?
            }
            "log_filter" => self.log_filter = value.to_string(),
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    _ => return Err(invalid("on or off")),
                }
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown setting `{other}` (expected one of: {})",
                    SETTABLE_KEYS.join(", ")
                )))
            }
        }
        if let Err(err) = self.validate() {
            *self = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes must be within ±{MAX_OFFSET_MINUTES}"
            )));
        }
        if self.decimal_separator == self.grouping_separator {
            return Err(ConfigError::Invalid(
                "decimal and grouping separators must differ".into(),
            ));
        }
        Ok(())
    }
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}
