//! QueueObserver port - the owner's view of the queue.
//!
//! Callbacks run on the queue's runtime task, one at a time. They must not
//! block; calling back into a `QueueHandle` from a callback is fine.

use crate::domain::RequestError;
use crate::queue::RequestRecord;

pub trait QueueObserver: Send + Sync {
    fn connectivity_changed(&self, _connected: bool) {}

    /// Aggregate progress in 0..=1.
    fn progress_changed(&self, _progress: f64) {}

    /// Veto an attempt before it starts. A refusal ends the current scheduling pass.
    fn should_attempt(&self, _request: &RequestRecord) -> bool {
        true
    }

    /// Force a retry after an application error the request itself declined to retry.
    fn should_reattempt(&self, _request: &RequestRecord, _error: &RequestError) -> bool {
        false
    }

    fn request_started(&self, _request: &RequestRecord) {}

    /// The request's status text changed (it is being retried in place).
    fn request_updated(&self, _request: &RequestRecord) {}

    fn request_finished(&self, _request: &RequestRecord) {}

    fn request_failed(&self, _request: &RequestRecord, _error: &RequestError) {}
}

/// Observer that ignores everything and approves every attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl QueueObserver for NoopObserver {}
