//! App - wires ports, the queue state machine and the runtime task together.
//!
//! # Components
//! - **QueueBuilder**: construction and startup validation
//! - **Queue / QueueHandle**: owner of the runtime task / cloneable command sender
//! - **runtime**: the select loop that owns `QueueCore`
//! - **QueueDirectory**: one queue per name under a shared root
//! - **status**: snapshots for display and tests

pub mod builder;
pub mod directory;
pub mod handle;
pub(crate) mod runtime;
pub mod status;

pub use self::builder::{BuildError, QueueBuilder};
pub use self::directory::{DEFAULT_QUEUE_NAME, QueueDirectory};
pub use self::handle::{Queue, QueueHandle};
pub use self::status::{QueueSnapshot, TaskSummary};
