use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: request spans and prize events at
/// info, axum/hyper internals at warn.
pub const DEFAULT_FILTER: &str = "info,tower_http=info,axum=warn,hyper=warn";

/// JSON output also carries storage-level debug lines (missing keys, backend selection).
pub const JSON_FILTER: &str = "info,service::storage=debug,tower_http=info,axum=warn,hyper=warn";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Compact single-line logs on stdout for local runs.
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(filter_or(DEFAULT_FILTER))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// One JSON object per line, with targets kept so storage backends can be
/// told apart when the log is shipped off the host.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(filter_or(JSON_FILTER))
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// `LOG_FORMAT=json` selects JSON; anything else is compact.
pub fn init_logging_from_env() {
    match std::env::var("LOG_FORMAT") {
        Ok(v) if v.eq_ignore_ascii_case("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}
