//! Request phase within a queue.

use serde::{Deserialize, Serialize};

/// Phase of a tracked request.
///
/// Transitions:
/// - Pending -> Active (attempt started)
/// - Active -> Pending (network error, or retry approved)
/// - Active -> (dropped) on success, declined retry, or watchdog expiry
///
/// Finished requests are not tracked at all, so there is no terminal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    /// Waiting for a scheduling pass.
    Pending,

    /// `perform` is running and a watchdog is armed.
    Active,
}

impl RequestPhase {
    pub fn is_active(self) -> bool {
        matches!(self, RequestPhase::Active)
    }
}
