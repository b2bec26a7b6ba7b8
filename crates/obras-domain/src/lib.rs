//! obras-domain
//!
//! Pure domain models (Obra, Anote, week groups, budget totals).
//! No I/O, no HTTP, no storage. Only data types and their invariants.

pub mod anote;
pub mod common;
pub mod obra;
pub mod summary;

pub use anote::*;
pub use common::*;
pub use obra::*;
pub use summary::*;
