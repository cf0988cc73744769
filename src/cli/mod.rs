//! CLI operation handlers.
//!
//! - [`aggregate`]: Resolve input and token, then drive one aggregation run
//!
//! Output formatting utilities are in [`output`].

pub mod aggregate;
pub mod output;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// Defaults to warnings only so that the table on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _already_installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
