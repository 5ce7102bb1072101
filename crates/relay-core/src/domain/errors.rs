//! Error types and their classification.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Transport-level failure kinds. These are always retried in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkFailure {
    TimedOut,
    NotConnectedToInternet,
    ConnectionLost,
}

impl fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkFailure::TimedOut => "timed out",
            NetworkFailure::NotConnectedToInternet => "not connected to internet",
            NetworkFailure::ConnectionLost => "connection lost",
        };
        f.write_str(s)
    }
}

/// Error reported by a request attempt, or synthesized by the queue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Connectivity problem; the request stays queued.
    #[error("network failure ({kind}): {message}")]
    Network {
        kind: NetworkFailure,
        message: String,
    },

    /// Anything the request itself considers a failure (bad status, rejected payload, ...).
    #[error("{message}")]
    Application { code: i64, message: String },

    /// The queue gave up waiting for the attempt.
    #[error("request timed out after {after:?}")]
    WatchdogExpired { after: Duration },
}

impl RequestError {
    pub fn network(kind: NetworkFailure, message: impl Into<String>) -> Self {
        Self::Network {
            kind,
            message: message.into(),
        }
    }

    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self::Application {
            code,
            message: message.into(),
        }
    }

    /// The transport failure kind, if any. Transport errors are transient
    /// and never reported as hard failures.
    pub fn network_failure(&self) -> Option<NetworkFailure> {
        match self {
            RequestError::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Errors from queue handle operations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("queue runtime has stopped")]
    QueueClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_errors_carry_a_transport_failure() {
        assert_eq!(
            RequestError::network(NetworkFailure::ConnectionLost, "reset").network_failure(),
            Some(NetworkFailure::ConnectionLost)
        );
        assert_eq!(RequestError::application(400, "bad request").network_failure(), None);
        assert_eq!(
            RequestError::WatchdogExpired {
                after: Duration::from_secs(1)
            }
            .network_failure(),
            None
        );
    }

    #[test]
    fn messages_are_human_readable() {
        let err = RequestError::network(NetworkFailure::NotConnectedToInternet, "offline");
        assert_eq!(
            err.to_string(),
            "network failure (not connected to internet): offline"
        );

        let err = RequestError::application(500, "server exploded");
        assert_eq!(err.to_string(), "server exploded");
    }
}
