//! The request contract supplied by the embedding application.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::errors::RequestError;
use super::ids::RequestId;
use crate::queue::QueueEvent;

/// Owner-defined key/value representation of a request, used to revive it
/// after a restart. An empty map means "not revivable".
pub type RequestDictionary = serde_json::Map<String, serde_json::Value>;

/// A unit of deferred, retryable work.
///
/// The queue never looks inside a request: it only calls `perform`, asks
/// `should_retry` after non-network errors, and persists `to_dictionary`.
///
/// # Example
/// ```ignore
/// struct Ping;
///
/// #[async_trait]
/// impl Request for Ping {
///     fn title(&self) -> String {
///         "ping".into()
///     }
///
///     async fn perform(&self, _ctx: RequestContext) -> Result<(), RequestError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Request: Send + Sync + 'static {
    /// Label shown next to the status. Read once, when the request is enqueued.
    fn title(&self) -> String;

    /// Run one attempt. Returning is the completion signal; a future that never
    /// resolves is caught by the queue's watchdog.
    async fn perform(&self, ctx: RequestContext) -> Result<(), RequestError>;

    /// Whether to try again after a non-network error.
    fn should_retry(&self, _error: &RequestError) -> bool {
        false
    }

    /// Representation written to the queue archive.
    fn to_dictionary(&self) -> RequestDictionary {
        RequestDictionary::new()
    }
}

/// Handle passed to each attempt so the request can talk back to its queue.
///
/// All calls are fire-and-forget; they become no-ops once the attempt has
/// been resolved or the queue has shut down.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: RequestId,
    attempt: u64,
    events: mpsc::UnboundedSender<QueueEvent>,
}

impl RequestContext {
    pub(crate) fn new(id: RequestId, attempt: u64, events: mpsc::UnboundedSender<QueueEvent>) -> Self {
        Self { id, attempt, events }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// 1-based attempt number of this run.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Report this attempt's progress (clamped to 0..=1).
    pub fn update_progress(&self, fraction: f64) {
        let _ = self.events.send(QueueEvent::Progress {
            id: self.id,
            attempt: self.attempt,
            fraction,
        });
    }

    /// Rearm the watchdog for a full timeout from now.
    pub fn heartbeat(&self) {
        let _ = self.events.send(QueueEvent::Heartbeat {
            id: self.id,
            attempt: self.attempt,
        });
    }

    /// Ask the queue to rewrite its archive, e.g. after the request's
    /// dictionary changed mid-flight.
    pub fn save(&self) {
        let _ = self.events.send(QueueEvent::SaveRequested { id: self.id });
    }
}
