//! Deferred removal of temporary artifacts.
//!
//! Each scheduled path gets its own fire-and-forget tokio task that sleeps
//! for the delay and then deletes the file. A file that is already gone
//! counts as removed.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct CleanupQueue {
    handle: Handle,
}

impl CleanupQueue {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Queue bound to the runtime of the calling context.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::Other(format!("cleanup needs a tokio runtime: {}", e)))
    }

    /// Delete `path` after `delay`. The returned handle resolves to whether
    /// the file is gone; callers are free to drop it.
    pub fn schedule(&self, path: PathBuf, delay: Duration) -> JoinHandle<bool> {
        log::debug!("scheduling removal of {} in {:?}", path.display(), delay);
        self.handle.spawn(remove_after(path, delay))
    }
}

/// Sleep for `delay`, then remove `path`.
pub async fn remove_after(path: PathBuf, delay: Duration) -> bool {
    tokio::time::sleep(delay).await;
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            log::info!("removed temporary file {}", path.display());
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("{} already removed", path.display());
            true
        }
        Err(e) => {
            log::warn!("failed to remove {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.pdf");
        std::fs::write(&path, b"x").unwrap();

        let queue = CleanupQueue::current().unwrap();
        let task = queue.schedule(path.clone(), Duration::from_millis(20));
        assert!(path.exists());
        assert!(task.await.unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_after(dir.path().join("gone.png"), Duration::ZERO).await);
    }

    #[test]
    fn current_without_runtime_fails() {
        assert!(CleanupQueue::current().is_err());
    }
}
