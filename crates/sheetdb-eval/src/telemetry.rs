//! Diagnostics setup for hosts that want to see the evaluator's spans.
//!
//! Spans and events are compiled in only with the `tracing` feature.

/// Environment variable holding the filter directive, e.g. `sheetdb_eval=debug`.
pub const LOG_ENV: &str = "SHEETDB_LOG";

#[cfg(feature = "tracing")]
fn env_filter() -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "warn".into())
}

/// Install a formatting subscriber filtered by `SHEETDB_LOG`, then
/// `RUST_LOG`, then `warn`. Returns `false` when a global subscriber was
/// already set.
#[cfg(feature = "tracing")]
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Without the `tracing` feature there is nothing to install.
#[cfg(not(feature = "tracing"))]
pub fn init_tracing() -> bool {
    false
}
