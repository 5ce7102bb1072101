//! relay-core
//!
//! A persistent, connectivity-aware queue for requests that must eventually
//! reach a server.
//!
//! # Modules
//! - **domain**: request contract, ids, errors, status text, retry decisions
//! - **config**: `QueueConfig` (timeouts, polling interval, concurrency cap)
//! - **ports**: seams the owner plugs into (archive store, connectivity, observer, factory)
//! - **impls**: in-tree port implementations (file/memory stores, manual connectivity, tracing observer)
//! - **typed**: kind-tagged dictionaries and the revival registry
//! - **queue**: request records and the scheduling state machine
//! - **app**: builder, runtime task, handles, named directory, snapshots

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;
pub mod typed;

pub use app::{BuildError, Queue, QueueBuilder, QueueDirectory, QueueHandle, QueueSnapshot, TaskSummary};
pub use config::QueueConfig;
pub use domain::{NetworkFailure, RelayError, Request, RequestContext, RequestDictionary, RequestError, RequestId, RequestStatus};
pub use ports::{ArchiveStore, ConnectivityMonitor, ConnectivityStatus, QueueObserver, RequestFactory};
pub use queue::{RequestPhase, RequestRecord};
pub use typed::{RequestRegistry, Revivable};
