//! Shared access to a document store.
//!
//! The editor mutates the document while the orchestrator reads it from
//! another task, so the store lives behind an async `RwLock`: `commit` and
//! `undo` take the write lock (single writer), reads clone a consistent
//! snapshot and never hold the lock across an await. A snapshot may be one
//! version stale by the time it is used; context is rebuilt fresh each turn,
//! so that is acceptable.

use crate::store::{DocumentStore, DocumentVersion, UndoStatus};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to a shared [`DocumentStore`].
#[derive(Clone)]
pub struct DocumentHandle {
    inner: Arc<RwLock<DocumentStore>>,
}

impl DocumentHandle {
    /// A handle to a fresh store (initial empty version).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DocumentStore::new())),
        }
    }

    /// Snapshot of the current version.
    pub async fn current(&self) -> DocumentVersion {
        self.inner.read().await.current().clone()
    }

    /// Commit new content; returns the new or unchanged sequence number.
    pub async fn commit(&self, content: impl Into<String>) -> u64 {
        self.inner.write().await.commit(content)
    }

    /// Rewind one version; see [`DocumentStore::undo`].
    pub async fn undo(&self) -> (DocumentVersion, UndoStatus) {
        self.inner.write().await.undo()
    }

    /// Number of committed revisions.
    pub async fn version_count(&self) -> usize {
        self.inner.read().await.version_count()
    }

    /// Snapshot of the full ordered history.
    pub async fn history(&self) -> Vec<DocumentVersion> {
        self.inner.read().await.history().to_vec()
    }
}

impl Default for DocumentHandle {
    fn default() -> Self {
        Self::new()
    }
}
