use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,axum=info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, defaults to `info` with catalog storage at `debug`
/// - Writes to stdout for consistent container logging behavior
pub fn init_logging_json() {
    // RUST_LOG=info,service::storage=trace for per-request backend detail
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,service::storage=debug"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Pick the formatter from `LOG_FORMAT` (`json` or anything else for compact).
pub fn init_logging_from_env() {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}
