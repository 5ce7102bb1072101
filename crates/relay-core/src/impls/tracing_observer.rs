//! TracingObserver - logs owner callbacks through `tracing`.

use tracing::{debug, info, warn};

use crate::domain::RequestError;
use crate::ports::QueueObserver;
use crate::queue::RequestRecord;

/// Approves every attempt, never forces retries, and logs each event.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    queue: String,
}

impl TracingObserver {
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
        }
    }
}

impl QueueObserver for TracingObserver {
    fn connectivity_changed(&self, connected: bool) {
        info!(queue = %self.queue, connected, "connectivity changed");
    }

    fn progress_changed(&self, progress: f64) {
        debug!(queue = %self.queue, progress, "progress");
    }

    fn request_started(&self, request: &RequestRecord) {
        info!(
            queue = %self.queue,
            request_id = %request.id(),
            attempt = request.attempt(),
            title = %request.title(),
            "request started"
        );
    }

    fn request_updated(&self, request: &RequestRecord) {
        info!(
            queue = %self.queue,
            request_id = %request.id(),
            failures = request.failures(),
            status = %request.status(),
            "request will retry"
        );
    }

    fn request_finished(&self, request: &RequestRecord) {
        info!(queue = %self.queue, request_id = %request.id(), title = %request.title(), "request finished");
    }

    fn request_failed(&self, request: &RequestRecord, error: &RequestError) {
        warn!(
            queue = %self.queue,
            request_id = %request.id(),
            title = %request.title(),
            error = %error,
            "request failed"
        );
    }
}
