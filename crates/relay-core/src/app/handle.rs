//! QueueHandle / Queue - the caller-facing side of a running queue.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::status::QueueSnapshot;
use crate::domain::{RelayError, Request, RequestId};
use crate::queue::{PendingTransform, RequestRecord};

/// Requests accepted by the runtime task.
pub(crate) enum Command {
    Enqueue {
        records: Vec<RequestRecord>,
        start_immediately: bool,
    },
    AttemptNext,
    ModifyPending(PendingTransform),
    ClearAll,
    Snapshot(oneshot::Sender<QueueSnapshot>),
}

/// Cheap, cloneable sender into one queue.
///
/// Every method except `snapshot` only enqueues a command and returns, so it is
/// safe to call from inside `QueueObserver` callbacks.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    name: Arc<str>,
    commands: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Enqueue {
                records,
                start_immediately,
            } => f
                .debug_struct("Enqueue")
                .field("records", &records.len())
                .field("start_immediately", start_immediately)
                .finish(),
            Command::AttemptNext => f.write_str("AttemptNext"),
            Command::ModifyPending(_) => f.write_str("ModifyPending"),
            Command::ClearAll => f.write_str("ClearAll"),
            Command::Snapshot(_) => f.write_str("Snapshot"),
        }
    }
}

impl QueueHandle {
    pub(crate) fn new(name: &str, commands: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            name: Arc::from(name),
            commands,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue one request and start it if capacity and connectivity allow.
    pub fn enqueue<R: Request>(&self, request: R) -> Result<RequestId, RelayError> {
        let ids = self.enqueue_all(vec![Arc::new(request) as Arc<dyn Request>], true)?;
        ids.into_iter().next().ok_or(RelayError::QueueClosed)
    }

    /// Enqueue a batch, in order. With `start_immediately == false` the batch
    /// waits for the next scheduling pass.
    pub fn enqueue_all(
        &self,
        requests: Vec<Arc<dyn Request>>,
        start_immediately: bool,
    ) -> Result<Vec<RequestId>, RelayError> {
        let records: Vec<RequestRecord> = requests.into_iter().map(RequestRecord::new).collect();
        let ids = records.iter().map(RequestRecord::id).collect();
        self.send(Command::Enqueue {
            records,
            start_immediately,
        })?;
        Ok(ids)
    }

    /// Run a scheduling pass now instead of waiting for the next tick.
    pub fn attempt_next(&self) -> Result<(), RelayError> {
        self.send(Command::AttemptNext)
    }

    /// Rewrite the pending (not active) requests: reorder, drop, or insert.
    /// Active requests are never passed to `transform` and stay first.
    pub fn modify_pending<F>(&self, transform: F) -> Result<(), RelayError>
    where
        F: FnOnce(Vec<RequestRecord>) -> Vec<RequestRecord> + Send + 'static,
    {
        self.send(Command::ModifyPending(Box::new(transform)))
    }

    /// Drop every tracked request and reset the counters.
    pub fn clear_all(&self) -> Result<(), RelayError> {
        self.send(Command::ClearAll)
    }

    pub async fn snapshot(&self) -> Result<QueueSnapshot, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| RelayError::QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), RelayError> {
        debug!(queue = %self.name, ?command, "queue command");
        self.commands.send(command).map_err(|_| RelayError::QueueClosed)
    }
}

/// A running queue: its handle plus ownership of the runtime task.
///
/// Dropping a `Queue` stops the runtime as well; `shutdown_and_join` does the
/// same but waits for it to finish.
pub struct Queue {
    handle: QueueHandle,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl Queue {
    pub(crate) fn new(handle: QueueHandle, shutdown_tx: watch::Sender<bool>, join: JoinHandle<()>) -> Self {
        Self {
            handle,
            shutdown_tx,
            join,
        }
    }

    pub fn handle(&self) -> QueueHandle {
        self.handle.clone()
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Ask the runtime to stop. Active attempts are aborted; they stay in the
    /// archive and are revived by the next build.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

impl std::ops::Deref for Queue {
    type Target = QueueHandle;

    fn deref(&self) -> &QueueHandle {
        &self.handle
    }
}
