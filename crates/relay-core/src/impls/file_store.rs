//! FileArchiveStore - one JSON file per queue.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::ports::{ArchiveStore, QueueArchive, StoreError};

/// Stores a queue archive at `<dir>/<name>.json`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous archive intact.
#[derive(Debug, Clone)]
pub struct FileArchiveStore {
    path: PathBuf,
}

impl FileArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>, queue_name: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{queue_name}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ArchiveStore for FileArchiveStore {
    fn load(&self) -> Result<Option<QueueArchive>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn save(&self, archive: &QueueArchive) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(archive)?;
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
