use dashmap::DashMap;
use std::env;
use std::sync::Arc;
use thiserror::Error;

pub const DEBUG: &str = "DEBUG";
pub const BODY_LIMIT: &str = "BODY_LIMIT";
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Default cap on buffered request bodies: 2 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid boolean for {key}: {value}")]
    InvalidBool { key: String, value: String },

    #[error("Invalid number for {key}: {value}")]
    InvalidNumber { key: String, value: String },

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Snapshot of the process environment.
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidBool {
                key: key.to_string(),
                value,
            }),
        }
    }

    pub fn get_usize(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        self.get(key)
            .map(|value| {
                value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidNumber {
                    key: key.to_string(),
                    value,
                })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Typed settings read by the exception layer, the views and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Expose internal error detail to the caller.
    pub debug: bool,
    pub body_limit: usize,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            body_limit: DEFAULT_BODY_LIMIT,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(&ConfigService::new())
    }

    pub fn from_config(config: &ConfigService) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let log_format = config.get(LOG_FORMAT).unwrap_or_default();
        let log_format = match log_format.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => return Err(ConfigError::InvalidLogFormat(log_format)),
        };

        Ok(Self {
            debug: config.get_bool(DEBUG)?.unwrap_or(defaults.debug),
            body_limit: config.get_usize(BODY_LIMIT)?.unwrap_or(defaults.body_limit),
            log_format,
        })
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_config(&ConfigService::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!settings.debug);
    }

    #[test]
    fn test_reads_values() {
        let config = ConfigService::default();
        config.set(DEBUG, "True");
        config.set(BODY_LIMIT, "1024");
        config.set(LOG_FORMAT, "json");

        let settings = Settings::from_config(&config).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.body_limit, 1024);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_ignores_case() {
        let config = ConfigService::default();
        config.set(LOG_FORMAT, " JSON ");
        assert_eq!(Settings::from_config(&config).unwrap().log_format, LogFormat::Json);

        config.set(LOG_FORMAT, "Pretty");
        assert_eq!(Settings::from_config(&config).unwrap().log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let config = ConfigService::default();
        config.set(DEBUG, "maybe");
        assert_eq!(
            Settings::from_config(&config),
            Err(ConfigError::InvalidBool {
                key: DEBUG.to_string(),
                value: "maybe".to_string(),
            })
        );

        let config = ConfigService::default();
        config.set(BODY_LIMIT, "-1");
        assert!(matches!(
            Settings::from_config(&config),
            Err(ConfigError::InvalidNumber { .. })
        ));

        let config = ConfigService::default();
        config.set(LOG_FORMAT, "xml");
        assert_eq!(
            Settings::from_config(&config),
            Err(ConfigError::InvalidLogFormat("xml".to_string()))
        );
    }
}
