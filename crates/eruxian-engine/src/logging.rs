//! Structured logging setup.
//!
//! `RUST_LOG` wins when set; otherwise the filter comes from
//! `logging.level` in the config. `logging.format` picks between the
//! human-readable formatter and one JSON object per line.

use eruxian_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Build the filter from `RUST_LOG`, falling back to `fallback`.
///
/// An unparseable fallback degrades to `info`.
pub fn build_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns [`EngineError::Logging`] if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter = build_filter(&config.level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_still_builds_a_filter() {
        // Directive syntax errors must not abort startup.
        let filter = build_filter("info,[[[");
        assert!(!filter.to_string().is_empty());
    }
}
