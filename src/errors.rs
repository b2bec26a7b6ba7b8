use thiserror::Error;

use obras_config::ConfigError;
use obras_core::CoreError;

/// Top-level failure of the binary: startup, configuration or serving.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Server error: {0}")]
    Server(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
