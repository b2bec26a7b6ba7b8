//! obras-core
//!
//! Weekly aggregation engine, persistence contract and services for obras.
//! Depends on obras-domain. No HTTP, no terminal I/O, no file access.

pub mod aggregation;
pub mod anote_service;
pub mod error;
pub mod format;
pub mod memory;
pub mod obra_service;
pub mod storage;
pub mod summary_service;
pub mod time;

#[cfg(test)]
mod tests;

pub use aggregation::*;
pub use anote_service::*;
pub use error::CoreError;
pub use memory::MemoryStore;
pub use obra_service::*;
pub use storage::{ObraStore, Snapshot, CURRENT_SCHEMA_VERSION};
pub use summary_service::*;
pub use time::{Clock, FixedClock, SystemClock};
