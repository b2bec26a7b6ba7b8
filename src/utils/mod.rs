pub mod build_info;

use tracing_subscriber::{fmt, EnvFilter};

/// Fallback used when the configured directive does not parse.
pub const DEFAULT_DIRECTIVE: &str = "obras=info";

/// Installs the global fmt subscriber. `RUST_LOG` wins over `directive`.
pub fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A subscriber may already be installed by a test harness.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
