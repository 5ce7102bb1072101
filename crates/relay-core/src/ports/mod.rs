//! Ports - the seams between the queue and the outside world.
//!
//! Each trait stands for a collaborator the queue consumes (storage,
//! connectivity, request revival) or notifies (the owner).

pub mod archive_store;
pub mod connectivity;
pub mod observer;
pub mod request_factory;

pub use self::archive_store::{ArchiveStore, QueueArchive, StoreError};
pub use self::connectivity::{ConnectivityMonitor, ConnectivityStatus};
pub use self::observer::{NoopObserver, QueueObserver};
pub use self::request_factory::RequestFactory;
