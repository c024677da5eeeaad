//! Per-folder serialization of attachment writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock map keyed by attachment folder.
///
/// Numbered variants of a name share its folder, so holding the folder
/// lock makes the duplicate check, the free-name lookup and the write one
/// step for every document exporting into it.
#[derive(Clone, Default)]
pub struct AttachmentLocks {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>>,
}

impl AttachmentLocks {
    /// Creates an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `path`.
    pub async fn acquire(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = self
            .inner
            .lock()
            .entry(path.to_path_buf())
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    /// Drops entries nobody is holding.
    pub fn prune(&self) {
        self.inner.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true when no path is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
