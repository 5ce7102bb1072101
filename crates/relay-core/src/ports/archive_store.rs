//! ArchiveStore port - durable storage for a queue's pending requests.
//!
//! The archive is one named array: the dictionaries of every incomplete,
//! revivable request, in queue order. Writes replace the whole archive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::RequestDictionary;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueArchive {
    #[serde(default)]
    pub pending_request_dictionaries: Vec<RequestDictionary>,
}

impl QueueArchive {
    pub fn new(pending_request_dictionaries: Vec<RequestDictionary>) -> Self {
        Self {
            pending_request_dictionaries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending_request_dictionaries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("archive i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive is not valid json: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Synchronous by contract: the queue writes inline after every state change.
pub trait ArchiveStore: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<QueueArchive>, StoreError>;

    fn save(&self, archive: &QueueArchive) -> Result<(), StoreError>;
}
