//! QueueBuilder - wiring and startup validation for one queue.
//!
//! `build` fails fast: bad config, a missing store, or an archive nobody can
//! revive are reported before any task is spawned.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::handle::{Queue, QueueHandle};
use super::runtime::{self, RuntimeChannels};
use crate::config::{ConfigError, QueueConfig};
use crate::impls::FileArchiveStore;
use crate::ports::{ArchiveStore, ConnectivityMonitor, NoopObserver, QueueObserver, RequestFactory, StoreError};
use crate::queue::{QueueCore, RequestRecord};

/// # Example
/// ```ignore
/// let queue = QueueBuilder::new("offline_requests")
///     .config(QueueConfig::default().with_max_concurrent_requests(2))
///     .file_store("/var/lib/app/queues")
///     .connectivity(monitor)
///     .observer(Arc::new(TracingObserver::new("offline_requests")))
///     .factory(registry)
///     .build()?;
///
/// queue.enqueue(CheckIn { place: "Lima".into() })?;
/// ```
pub struct QueueBuilder {
    name: String,
    config: QueueConfig,
    store: Option<Box<dyn ArchiveStore>>,
    connectivity: Option<Arc<dyn ConnectivityMonitor>>,
    observer: Option<Arc<dyn QueueObserver>>,
    factory: Option<Arc<dyn RequestFactory>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid queue config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("queue '{0}' has no archive store")]
    MissingStore(String),

    #[error("archive holds {pending} request(s) but no request factory was set")]
    MissingFactory { pending: usize },

    #[error("failed to load archive: {0}")]
    Store(#[from] StoreError),

    #[error("queues must be built inside a tokio runtime")]
    NoRuntime,
}

impl QueueBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: QueueConfig::default(),
            store: None,
            connectivity: None,
            observer: None,
            factory: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(mut self, config: QueueConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: impl ArchiveStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Persist to `<dir>/<name>.json`.
    pub fn file_store(self, dir: impl AsRef<Path>) -> Self {
        let store = FileArchiveStore::in_dir(dir, &self.name);
        self.store(store)
    }

    /// Without a monitor the queue assumes it is always connected.
    pub fn connectivity(mut self, monitor: Arc<dyn ConnectivityMonitor>) -> Self {
        self.connectivity = Some(monitor);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn QueueObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn factory(mut self, factory: impl RequestFactory + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn build(self) -> Result<Queue, BuildError> {
        self.config.validate()?;
        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;
        let store = self.store.ok_or_else(|| BuildError::MissingStore(self.name.clone()))?;

        let archive = store.load()?.unwrap_or_default();
        let restored = if archive.is_empty() {
            Vec::new()
        } else {
            let factory = self.factory.as_ref().ok_or(BuildError::MissingFactory {
                pending: archive.pending_request_dictionaries.len(),
            })?;
            revive_all(&self.name, factory.as_ref(), &archive.pending_request_dictionaries)
        };

        let observer = self.observer.unwrap_or_else(|| Arc::new(NoopObserver));
        let status_rx = self.connectivity.as_ref().map(|monitor| monitor.subscribe());

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut core = QueueCore::new(
            self.name.clone(),
            self.config,
            store,
            observer,
            self.connectivity,
            events_tx,
        );
        core.restore(restored);

        let join = runtime.spawn(runtime::run(
            core,
            RuntimeChannels {
                commands: commands_rx,
                events: events_rx,
                connectivity: status_rx,
                shutdown: shutdown_rx,
            },
        ));

        Ok(Queue::new(QueueHandle::new(&self.name, commands_tx), shutdown_tx, join))
    }
}

fn revive_all(
    queue: &str,
    factory: &dyn RequestFactory,
    dictionaries: &[crate::domain::RequestDictionary],
) -> Vec<RequestRecord> {
    dictionaries
        .iter()
        .filter_map(|dictionary| {
            let revived = factory.revive(dictionary);
            if revived.is_none() {
                debug!(queue, "archived request could not be revived; dropping");
            }
            revived
        })
        .map(RequestRecord::new)
        .collect()
}
