//! MemoryArchiveStore - shared in-memory archive for tests and ephemeral queues.

use std::sync::{Arc, Mutex, PoisonError};

use crate::ports::{ArchiveStore, QueueArchive, StoreError};

/// Clones share the same slot, so a test can hand one clone to a queue and
/// inspect (or reuse) the archive through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchiveStore {
    slot: Arc<Mutex<Option<QueueArchive>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryArchiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archive(archive: QueueArchive) -> Self {
        let store = Self::new();
        *store.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(archive);
        store
    }

    /// Last saved archive, if any.
    pub fn snapshot(&self) -> Option<QueueArchive> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `save` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ArchiveStore for MemoryArchiveStore {
    fn load(&self) -> Result<Option<QueueArchive>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, archive: &QueueArchive) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(archive.clone());
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_archive() {
        let store = MemoryArchiveStore::new();
        let other = store.clone();
        assert!(store.load().unwrap().is_none());

        other.save(&QueueArchive::default()).unwrap();

        assert_eq!(store.snapshot(), Some(QueueArchive::default()));
        assert_eq!(store.write_count(), 1);
    }
}
