//! Observability and telemetry.
//!
//! Structured logging via `tracing` and the analytics event bus. Metrics
//! are emitted through the `metrics` facade; installing a recorder is
//! the embedding application's choice.

mod event_bus;

pub use event_bus::{DEFAULT_EVENT_BUS_CAPACITY, EventBus, FilteredReceiver};

use crate::{Error, Result};
use std::sync::OnceLock;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for terminals.
    #[default]
    Pretty,
    /// One JSON object per line for collectors.
    Json,
}

impl LogFormat {
    /// Parses a format name leniently, defaulting to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

/// Initializes process-wide logging.
///
/// The filter comes from `RUST_LOG` when set, otherwise `debug` with
/// `verbose` and `info` without.
///
/// # Errors
///
/// Returns an error if logging has already been initialized.
pub fn init_logging(format: LogFormat, verbose: bool) -> Result<()> {
    if LOGGING_INIT.get().is_some() {
        return Err(Error::InvalidInput(
            "logging already initialized".to_string(),
        ));
    }

    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let result = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    result.map_err(|e| Error::InvalidInput(format!("logging init failed: {e}")))?;

    LOGGING_INIT.set(()).map_err(|()| {
        Error::InvalidInput("failed to mark logging initialized".to_string())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }
}
