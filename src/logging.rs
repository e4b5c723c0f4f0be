//! Tracing setup.
//!
//! The library only emits `tracing` events; binaries and tests that want to
//! see them call [`init`] once.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INITIALIZED: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "info";


/// Install a global `fmt` subscriber filtered by `RUST_LOG`
/// (`info` when unset).
/// Subsequent calls are no-ops.
/// If another global subscriber is already installed,
/// that subscriber is kept.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false));

        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("tracing subscriber installed");
        }
    });
}
