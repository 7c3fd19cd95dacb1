//! Process-wide tracing setup.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, Settings};

pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Build the filter from `RUST_LOG` style directives.
///
/// Missing or unparsable directives fall back to [`DEFAULT_FILTER`].
pub fn filter_from(directives: Option<&str>) -> Result<EnvFilter, LoggingError> {
    directives
        .map(EnvFilter::try_new)
        .and_then(Result::ok)
        .map_or_else(|| EnvFilter::try_new(DEFAULT_FILTER), Ok)
        .map_err(|e| LoggingError::InvalidFilter(e.to_string()))
}

/// Install the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
///
/// Call once at startup, before the router is served.
pub fn init(settings: &Settings) -> Result<(), LoggingError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = filter_from(directives.as_deref())?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match settings.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_filter_when_unset() {
        let filter = filter_from(None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_invalid_directives_fall_back() {
        let filter = filter_from(Some("st1_axum=loud")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_directives_override_default() {
        let filter = filter_from(Some("debug")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
