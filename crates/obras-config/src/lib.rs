//! obras-config
//!
//! Server and presentation settings for obras.
//! Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{ConfigBackup, ConfigManager};
pub use model::{home_dir, Config, SETTABLE_KEYS};
