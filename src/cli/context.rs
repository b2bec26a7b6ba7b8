use std::path::{Path, PathBuf};

use chrono::FixedOffset;

use obras_config::{home_dir, Config, ConfigManager};
use obras_core::format::AmountStyle;
use obras_storage_json::JsonObraStore;

use super::{commands, registry::CommandEntry, registry::CommandRegistry, CommandError};

/// Everything a command needs: resolved paths, settings and the registry.
pub struct CliContext {
    pub registry: CommandRegistry,
    pub home: PathBuf,
    pub config: Config,
    pub config_manager: ConfigManager,
}

impl CliContext {
    /// Builds the context for the home directory chosen by `OBRAS_HOME`.
    pub fn load() -> Result<Self, CommandError> {
        Self::with_home(home_dir())
    }

    pub fn with_home(home: PathBuf) -> Result<Self, CommandError> {
        let config_manager = ConfigManager::with_base_dir(&home)?;
        let mut config = config_manager.load()?;
        config.apply_env_overrides()?;

        let mut registry = CommandRegistry::new();
        for entry in commands::all() {
            registry.register(entry);
        }

        Ok(Self {
            registry,
            home,
            config,
            config_manager,
        })
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.config.resolve_data_dir(&self.home)
    }

    pub fn open_store(&self) -> Result<JsonObraStore, CommandError> {
        Ok(JsonObraStore::open_with_retention(
            &self.data_dir(),
            self.config.backup_retention,
        )?)
    }

    pub fn offset(&self) -> Result<FixedOffset, CommandError> {
        Ok(self.config.utc_offset()?)
    }

    pub fn amount_style(&self) -> AmountStyle {
        AmountStyle {
            symbol: self.config.currency_symbol.clone(),
            decimal_separator: self.config.decimal_separator,
            grouping_separator: self.config.grouping_separator,
            ..AmountStyle::default()
        }
    }

    pub fn config_path(&self) -> &Path {
        self.config_manager.config_path()
    }
}
