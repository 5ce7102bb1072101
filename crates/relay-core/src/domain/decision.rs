//! Decision model: what happens to a request after an attempt completes.
//!
//! `decide` is pure. Applying the decision (moving records, persisting,
//! notifying the owner) is the queue core's job.

use super::errors::RequestError;
use super::status::RequestStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Attempt succeeded; drop the request and report it finished.
    Finish,

    /// Keep the request at its queue position and try again on a later pass.
    RetryInPlace { status: RequestStatus },

    /// Give up; drop the request and report the error.
    Fail,
}

/// Classify the result of an attempt.
///
/// `retry_approved` is only consulted for application errors. Network errors
/// always retry; watchdog expiry never does.
pub fn decide<F>(result: &Result<(), RequestError>, retry_approved: F) -> Decision
where
    F: FnOnce(&RequestError) -> bool,
{
    let error = match result {
        Ok(()) => return Decision::Finish,
        Err(error) => error,
    };

    if let Some(kind) = error.network_failure() {
        return Decision::RetryInPlace {
            status: RequestStatus::failed_network(kind),
        };
    }
    if matches!(error, RequestError::WatchdogExpired { .. }) {
        return Decision::Fail;
    }

    if retry_approved(error) {
        Decision::RetryInPlace {
            status: RequestStatus::failed_error(error.to_string()),
        }
    } else {
        Decision::Fail
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::NetworkFailure;
    use rstest::rstest;

    #[test]
    fn success_finishes() {
        assert_eq!(decide(&Ok(()), |_| true), Decision::Finish);
    }

    #[rstest]
    #[case::timed_out(NetworkFailure::TimedOut)]
    #[case::offline(NetworkFailure::NotConnectedToInternet)]
    #[case::lost(NetworkFailure::ConnectionLost)]
    fn network_errors_retry_without_asking(#[case] kind: NetworkFailure) {
        let mut asked = false;
        let decision = decide(&Err(RequestError::network(kind, "x")), |_| {
            asked = true;
            false
        });

        assert_eq!(
            decision,
            Decision::RetryInPlace {
                status: RequestStatus::failed_network(kind)
            }
        );
        assert!(!asked);
    }

    #[rstest]
    #[case::approved(true)]
    #[case::declined(false)]
    fn application_errors_follow_the_retry_policy(#[case] approved: bool) {
        let decision = decide(&Err(RequestError::application(409, "conflict")), |_| approved);

        if approved {
            assert_eq!(
                decision,
                Decision::RetryInPlace {
                    status: RequestStatus::failed_error("conflict")
                }
            );
        } else {
            assert_eq!(decision, Decision::Fail);
        }
    }

    #[test]
    fn watchdog_expiry_is_permanent() {
        let err = RequestError::WatchdogExpired {
            after: Duration::from_secs(120),
        };
        assert_eq!(decide(&Err(err), |_| true), Decision::Fail);
    }
}
