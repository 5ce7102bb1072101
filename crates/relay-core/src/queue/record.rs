//! Request record: a request plus the bookkeeping the queue keeps for it.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::AbortHandle;

use crate::domain::{Request, RequestDictionary, RequestId, RequestStatus};

/// Queue-owned wrapper around a request.
///
/// The request object itself stays untouched; id, status text, failure
/// count, progress and timer handles all live here.
pub struct RequestRecord {
    id: RequestId,
    request: Arc<dyn Request>,
    title: String,
    status: RequestStatus,
    failures: u32,
    progress: f64,

    /// Number of attempts started. Also the token that ties completions and
    /// watchdog firings to the attempt that produced them.
    attempt: u64,

    enqueued_at: DateTime<Utc>,
    last_attempt_at: Option<DateTime<Utc>>,

    perform_task: Option<AbortHandle>,
    watchdog: Option<AbortHandle>,

    /// Bumped every time a watchdog is armed; only the latest one may fire.
    watchdog_seq: u64,
}

impl RequestRecord {
    pub fn new(request: Arc<dyn Request>) -> Self {
        let title = request.title();
        Self {
            id: RequestId::generate(),
            request,
            title,
            status: RequestStatus::Queued,
            failures: 0,
            progress: 0.0,
            attempt: 0,
            enqueued_at: Utc::now(),
            last_attempt_at: None,
            perform_task: None,
            watchdog: None,
            watchdog_seq: 0,
        }
    }

    pub fn from_request<R: Request>(request: R) -> Self {
        Self::new(Arc::new(request))
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn request(&self) -> &dyn Request {
        self.request.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }

    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    pub fn dictionary(&self) -> RequestDictionary {
        self.request.to_dictionary()
    }

    pub(crate) fn shared_request(&self) -> Arc<dyn Request> {
        Arc::clone(&self.request)
    }

    /// Mark as active. Returns the new attempt token.
    pub(crate) fn begin_attempt(&mut self) -> u64 {
        self.attempt += 1;
        self.status = RequestStatus::Connecting;
        self.progress = 0.0;
        self.last_attempt_at = Some(Utc::now());
        self.attempt
    }

    /// Token for the watchdog about to be armed.
    pub(crate) fn next_watchdog_seq(&mut self) -> u64 {
        self.watchdog_seq += 1;
        self.watchdog_seq
    }

    pub(crate) fn watchdog_seq(&self) -> u64 {
        self.watchdog_seq
    }

    pub(crate) fn attach(&mut self, perform_task: AbortHandle, watchdog: AbortHandle) {
        self.perform_task = Some(perform_task);
        self.watchdog = Some(watchdog);
    }

    pub(crate) fn rearm_watchdog(&mut self, watchdog: AbortHandle) {
        if let Some(old) = self.watchdog.replace(watchdog) {
            old.abort();
        }
    }

    /// Stop the watchdog and forget the perform task (which keeps running).
    pub(crate) fn detach(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.abort();
        }
        self.perform_task = None;
    }

    pub(crate) fn abort_perform(&mut self) {
        if let Some(task) = self.perform_task.take() {
            task.abort();
        }
    }

    pub(crate) fn set_progress(&mut self, fraction: f64) {
        self.progress = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
    }

    pub(crate) fn mark_retry(&mut self, status: RequestStatus) {
        self.failures += 1;
        self.status = status;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.status = RequestStatus::Completed;
        self.progress = 1.0;
    }

    pub(crate) fn mark_failed(&mut self, status: RequestStatus) {
        self.failures += 1;
        self.status = status;
    }
}

impl Drop for RequestRecord {
    fn drop(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.abort();
        }
    }
}

impl fmt::Debug for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestRecord")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("status", &self.status)
            .field("failures", &self.failures)
            .field("progress", &self.progress)
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{RequestContext, RequestError};

    struct Named(&'static str);

    #[async_trait]
    impl Request for Named {
        fn title(&self) -> String {
            self.0.to_string()
        }

        async fn perform(&self, _ctx: RequestContext) -> Result<(), RequestError> {
            Ok(())
        }
    }

    #[test]
    fn new_record_is_queued_with_fixed_title() {
        let record = RequestRecord::from_request(Named("visit Peru"));

        assert_eq!(record.title(), "visit Peru");
        assert_eq!(record.status(), &RequestStatus::Queued);
        assert_eq!(record.attempt(), 0);
        assert!(record.dictionary().is_empty());
    }

    #[test]
    fn records_get_distinct_ids() {
        let a = RequestRecord::from_request(Named("a"));
        let b = RequestRecord::from_request(Named("b"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn begin_attempt_resets_progress_and_bumps_token() {
        let mut record = RequestRecord::from_request(Named("upload"));
        record.set_progress(0.7);

        let token = record.begin_attempt();

        assert_eq!(token, 1);
        assert_eq!(record.progress(), 0.0);
        assert_eq!(record.status(), &RequestStatus::Connecting);
        assert!(record.last_attempt_at().is_some());
    }

    #[test]
    fn progress_is_clamped() {
        let mut record = RequestRecord::from_request(Named("upload"));

        record.set_progress(1.5);
        assert_eq!(record.progress(), 1.0);

        record.set_progress(-0.2);
        assert_eq!(record.progress(), 0.0);

        record.set_progress(f64::NAN);
        assert_eq!(record.progress(), 0.0);
    }
}
