//! Diagnostic logging bootstrap.
//!
//! # Invariants
//! - Initialization happens at most once per process; later calls are no-ops.
//! - Initialization never panics; failures are returned as strings.

use flexi_logger::{Logger, LoggerHandle};
use log::debug;
use std::sync::OnceLock;

pub const LOG_ENV: &str = "MATH_ARCHIVIST_LOG";
const DEFAULT_LEVEL: &str = "warn";

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Start stderr logging with the level from `MATH_ARCHIVIST_LOG`
/// (default `warn`).
pub fn init_logging() -> Result<(), String> {
    let level = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    init_logging_with(&level)
}

pub fn init_logging_with(level: &str) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let level = normalize_level(level)?;
    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .format_for_stderr(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;
    let _ = LOGGER.set(handle);
    debug!(
        "event=app_start version={} level={level}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        )),
    }
}
