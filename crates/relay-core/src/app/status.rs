//! Status - point-in-time views of a queue, for UIs and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RequestId, RequestStatus};
use crate::queue::{RequestPhase, RequestRecord};

/// What a pending-uploads screen needs to render one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: RequestId,
    pub title: String,
    pub status: RequestStatus,
    /// `status` rendered for display ("Connecting…", "Failed: timeout", ...).
    pub subtitle: String,
    pub phase: RequestPhase,
    pub failures: u32,
    pub progress: f64,
    pub enqueued_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl TaskSummary {
    pub(crate) fn from_record(record: &RequestRecord, phase: RequestPhase) -> Self {
        Self {
            id: record.id(),
            title: record.title().to_string(),
            status: record.status().clone(),
            subtitle: record.status().to_string(),
            phase,
            failures: record.failures(),
            progress: record.progress(),
            enqueued_at: record.enqueued_at(),
            last_attempt_at: record.last_attempt_at(),
        }
    }
}

/// Counters and rows of one queue.
///
/// `total_count == completed_count + tasks.len()` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub name: String,
    pub total_count: usize,
    pub completed_count: usize,
    pub pending_count: usize,
    pub active_count: usize,
    pub progress: f64,
    pub connected: bool,
    /// Incomplete requests in enqueue order.
    pub tasks: Vec<TaskSummary>,
}

impl QueueSnapshot {
    pub fn is_drained(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: RequestId) -> Option<&TaskSummary> {
        self.tasks.iter().find(|task| task.id == id)
    }
}
