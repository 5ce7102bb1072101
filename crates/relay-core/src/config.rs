//! Queue configuration.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a valid
//! configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// How long one attempt may run (without a heartbeat) before it is failed.
    pub request_timeout_ms: u64,

    /// Period of the scheduling tick.
    pub submission_interval_ms: u64,

    /// Maximum number of attempts in flight at once.
    pub max_concurrent_requests: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 120_000,
            submission_interval_ms: 10_000,
            max_concurrent_requests: 10,
        }
    }
}

impl QueueConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn submission_interval(&self) -> Duration {
        Duration::from_millis(self.submission_interval_ms)
    }

    /// Stored in whole milliseconds: anything under 1ms rounds down to 0 and
    /// fails `validate`; overlong durations saturate.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = saturating_millis(timeout);
        self
    }

    /// Same millisecond rounding as `with_request_timeout`.
    pub fn with_submission_interval(mut self, interval: Duration) -> Self {
        self.submission_interval_ms = saturating_millis(interval);
        self
    }

    pub fn with_max_concurrent_requests(mut self, cap: usize) -> Self {
        self.max_concurrent_requests = cap;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                field: "request_timeout_ms",
            });
        }
        if self.submission_interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "submission_interval_ms",
            });
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Zero {
                field: "max_concurrent_requests",
            });
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = QueueConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.submission_interval(), Duration::from_secs(10));
        assert_eq!(config.max_concurrent_requests, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = QueueConfig::from_json_str(r#"{ "max_concurrent_requests": 2 }"#).unwrap();
        assert_eq!(config.max_concurrent_requests, 2);
        assert_eq!(config.request_timeout_ms, 120_000);
    }

    #[test]
    fn zero_cap_is_rejected() {
        let err = QueueConfig::from_json_str(r#"{ "max_concurrent_requests": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Zero {
                field: "max_concurrent_requests"
            }
        ));
    }

    #[test]
    fn durations_are_stored_in_whole_milliseconds() {
        let config = QueueConfig::default().with_request_timeout(Duration::MAX);
        assert_eq!(config.request_timeout_ms, u64::MAX);

        let config = QueueConfig::default().with_submission_interval(Duration::from_micros(900));
        assert_eq!(config.submission_interval_ms, 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "submission_interval_ms"
            })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = QueueConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
