//! QueueDirectory - one queue per name, all persisted under a shared root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::info;

use super::builder::{BuildError, QueueBuilder};
use super::handle::{Queue, QueueHandle};

/// Name used by apps that only need one queue.
pub const DEFAULT_QUEUE_NAME: &str = "offline_requests";

/// Opening the same name twice returns the same queue.
pub struct QueueDirectory {
    root: PathBuf,
    queues: Mutex<HashMap<String, Queue>>,
}

impl QueueDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the running queue called `name`, or build a file-backed one.
    ///
    /// `configure` only runs when the queue is built; it receives a builder
    /// that already has the name and the file store set.
    pub fn open<F>(&self, name: &str, configure: F) -> Result<QueueHandle, BuildError>
    where
        F: FnOnce(QueueBuilder) -> QueueBuilder,
    {
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(queue) = queues.get(name) {
            return Ok(queue.handle());
        }

        let queue = configure(QueueBuilder::new(name).file_store(&self.root)).build()?;
        let handle = queue.handle();
        info!(queue = name, root = %self.root.display(), "opened queue");
        queues.insert(name.to_string(), queue);
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Option<QueueHandle> {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(Queue::handle)
    }

    /// Names of the open queues, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Stop every queue and wait for their runtimes to exit.
    pub async fn shutdown_all(&self) {
        let queues: Vec<Queue> = self
            .queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, queue)| queue)
            .collect();
        for queue in queues {
            queue.shutdown_and_join().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("relay-directory-{}", ulid::Ulid::new()))
    }

    #[tokio::test]
    async fn same_name_returns_the_same_queue() {
        let root = scratch_dir();
        let directory = QueueDirectory::new(&root);

        let first = directory.open(DEFAULT_QUEUE_NAME, |b| b).unwrap();
        let second = directory
            .open(DEFAULT_QUEUE_NAME, |b| {
                b.config(QueueConfig::default().with_max_concurrent_requests(0))
            })
            .unwrap();

        assert_eq!(first.name(), second.name());
        assert_eq!(directory.names(), vec![DEFAULT_QUEUE_NAME.to_string()]);

        directory.shutdown_all().await;
        assert!(directory.get(DEFAULT_QUEUE_NAME).is_none());
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn queues_are_independent() {
        let root = scratch_dir();
        let directory = QueueDirectory::new(&root);

        let visits = directory.open("visits", |b| b).unwrap();
        let photos = directory.open("photos", |b| b).unwrap();

        visits.clear_all().unwrap();
        assert_eq!(visits.snapshot().await.unwrap().name, "visits");
        assert_eq!(photos.snapshot().await.unwrap().name, "photos");
        assert_eq!(directory.names(), vec!["photos".to_string(), "visits".to_string()]);

        directory.shutdown_all().await;
        assert!(visits.snapshot().await.is_err());
        let _ = std::fs::remove_dir_all(root);
    }
}
