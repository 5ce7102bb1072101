//! Queue module: request records, progress math, and the state machine that
//! schedules attempts.
//!
//! `QueueCore` is owned by exactly one runtime task (see `app::runtime`).
//! Callers never touch it directly; they go through a `QueueHandle`.

mod engine;
mod progress;
mod record;
mod state;

pub(crate) use engine::QueueCore;
pub use engine::{PendingTransform, QueueEvent};
pub use progress::aggregate as aggregate_progress;
pub use record::RequestRecord;
pub use state::RequestPhase;
