use obras_domain::RowId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Obra not found: {0}")]
    ObraNotFound(RowId),
    #[error("Anote not found: {0}")]
    AnoteNotFound(RowId),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
