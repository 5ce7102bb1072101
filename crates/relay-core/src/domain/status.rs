//! Human-readable request status (the "subtitle" shown next to a request's title).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::NetworkFailure;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestStatus {
    Queued,
    Connecting,
    FailedNetwork { reason: String },
    FailedError { message: String },
    FailedTimeout,
    Completed,
}

impl RequestStatus {
    pub fn failed_network(kind: NetworkFailure) -> Self {
        RequestStatus::FailedNetwork {
            reason: kind.to_string(),
        }
    }

    pub fn failed_error(message: impl Into<String>) -> Self {
        RequestStatus::FailedError {
            message: message.into(),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Queued => f.write_str("Queued"),
            RequestStatus::Connecting => f.write_str("Connecting…"),
            RequestStatus::FailedNetwork { reason } => write!(f, "Failed: network ({reason})"),
            RequestStatus::FailedError { message } => write!(f, "Failed: {message}"),
            RequestStatus::FailedTimeout => f.write_str("Failed: timeout"),
            RequestStatus::Completed => f.write_str("Completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::queued(RequestStatus::Queued, "Queued")]
    #[case::connecting(RequestStatus::Connecting, "Connecting…")]
    #[case::network(
        RequestStatus::failed_network(NetworkFailure::ConnectionLost),
        "Failed: network (connection lost)"
    )]
    #[case::error(RequestStatus::failed_error("HTTP 409"), "Failed: HTTP 409")]
    #[case::timeout(RequestStatus::FailedTimeout, "Failed: timeout")]
    #[case::completed(RequestStatus::Completed, "Completed")]
    fn subtitle_text(#[case] status: RequestStatus, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
    }
}
