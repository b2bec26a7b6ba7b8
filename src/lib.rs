//! obras keeps a ledger of expenses against construction projects ("obras")
//! and derives weekly groupings and budget totals from it. It serves the data
//! over HTTP and offers a small CLI for inspection and backups.

pub mod cli;
pub mod errors;
pub mod http;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with `directive` as the default filter.
pub fn init(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("obras tracing initialized");
    });
}
