//! Logging setup for the relay demo.
//!
//! Two output formats:
//! - Human-readable (default)
//! - JSON, enabled via RELAY_LOG_FORMAT=json

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; anything else is human-readable.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Human
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&std::env::var("RELAY_LOG_FORMAT").unwrap_or_default())
    }
}

/// Install the global subscriber.
///
/// # Environment Variables
/// - `RELAY_LOG_FORMAT`: `json` or human-readable
/// - `RELAY_LOG` or `RUST_LOG`: filter, e.g. `info`, `relay_core=debug`. Default `info`.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("RELAY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match LogFormat::from_env() {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(true).with_file(false).with_line_number(false))
                .init();
        }
        LogFormat::Human => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse(""), LogFormat::Human);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Human);
    }
}
