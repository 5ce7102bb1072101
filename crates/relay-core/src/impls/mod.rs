//! Impls - in-tree implementations of the ports.
//!
//! - **FileArchiveStore**: JSON file per queue (production default)
//! - **MemoryArchiveStore**: shared in-memory archive (tests, ephemeral queues)
//! - **ManualConnectivity**: hand-driven connectivity monitor
//! - **TracingObserver**: logs owner callbacks

pub mod file_store;
pub mod manual_connectivity;
pub mod memory_store;
pub mod tracing_observer;

pub use self::file_store::FileArchiveStore;
pub use self::manual_connectivity::ManualConnectivity;
pub use self::memory_store::MemoryArchiveStore;
pub use self::tracing_observer::TracingObserver;
