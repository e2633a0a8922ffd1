//! The document version store.
//!
//! An arena of immutable snapshots with a movable cursor. History is linear:
//! undo moves the cursor back without deleting anything, and a commit made
//! while rewound discards the versions past the cursor before appending (no
//! redo). Sequence numbers come from a separate monotonic counter, so a
//! discarded version's number is never reused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One immutable snapshot of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    /// The full document text at this version
    pub content: String,

    /// Monotonically increasing, unique per store instance
    pub sequence: u64,

    /// When this version was committed
    pub created_at: DateTime<Utc>,
}

/// Outcome flag for `undo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStatus {
    /// The cursor moved to the previous version
    Rewound,
    /// Only the initial version remains; nothing changed
    NothingToUndo,
}

/// Append-only version history with a movable current cursor.
///
/// Single-writer by assumption: `commit`, `undo`, and `current` must not
/// interleave. Share it through [`crate::DocumentHandle`] when the editor and
/// the orchestrator run concurrently.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    versions: Vec<DocumentVersion>,
    cursor: usize,
    next_sequence: u64,
}

impl DocumentStore {
    /// Create a store seeded with an initial empty version (sequence 0).
    /// The history is never empty after this.
    pub fn new() -> Self {
        Self {
            versions: vec![DocumentVersion {
                content: String::new(),
                sequence: 0,
                created_at: Utc::now(),
            }],
            cursor: 0,
            next_sequence: 1,
        }
    }

    /// The version at the cursor. Never fails.
    pub fn current(&self) -> &DocumentVersion {
        &self.versions[self.cursor]
    }

    /// Commit new content.
    ///
    /// A no-op when `new_content` equals the current content (duplicate
    /// versions would make history noise); otherwise any versions past the
    /// cursor are discarded and a fresh version is appended. Returns the new
    /// or unchanged sequence number.
    pub fn commit(&mut self, new_content: impl Into<String>) -> u64 {
        let new_content = new_content.into();
        let current = self.current();
        if new_content == current.content {
            debug!(sequence = current.sequence, "duplicate commit ignored");
            return current.sequence;
        }

        // A commit while rewound makes the cursor the new head of history.
        self.versions.truncate(self.cursor + 1);

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.versions.push(DocumentVersion {
            content: new_content,
            sequence,
            created_at: Utc::now(),
        });
        self.cursor = self.versions.len() - 1;
        debug!(sequence, versions = self.versions.len(), "committed");
        sequence
    }

    /// Move the cursor to the previous version and return it.
    ///
    /// At the initial version this is a no-op that reports
    /// [`UndoStatus::NothingToUndo`]; it is not an error.
    pub fn undo(&mut self) -> (DocumentVersion, UndoStatus) {
        if self.cursor == 0 {
            return (self.current().clone(), UndoStatus::NothingToUndo);
        }
        self.cursor -= 1;
        let version = self.current().clone();
        debug!(sequence = version.sequence, "undo");
        (version, UndoStatus::Rewound)
    }

    /// Number of committed revisions. The initial empty seed is not counted,
    /// so this equals the number of distinct-content commits accepted.
    pub fn version_count(&self) -> usize {
        self.versions.len() - 1
    }

    /// The full ordered history, oldest first. This is the serializable unit
    /// if persistence is ever layered on externally.
    pub fn history(&self) -> &[DocumentVersion] {
        &self.versions
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_empty_initial_version() {
        let store = DocumentStore::new();
        assert_eq!(store.current().content, "");
        assert_eq!(store.current().sequence, 0);
        assert_eq!(store.version_count(), 0);
    }

    #[test]
    fn current_tracks_last_distinct_commit() {
        let mut store = DocumentStore::new();
        store.commit("one");
        store.commit("two");
        store.commit("three");
        assert_eq!(store.current().content, "three");
        assert_eq!(store.version_count(), 3);
    }

    #[test]
    fn duplicate_commit_is_a_noop() {
        let mut store = DocumentStore::new();
        let first = store.commit("draft");
        let second = store.commit("draft");
        assert_eq!(first, second);
        assert_eq!(store.version_count(), 1);
    }

    #[test]
    fn undo_rewinds_one_version() {
        let mut store = DocumentStore::new();
        store.commit("a");
        store.commit("b");

        let (version, status) = store.undo();
        assert_eq!(status, UndoStatus::Rewound);
        assert_eq!(version.content, "a");
        assert_eq!(store.current().content, "a");
    }

    #[test]
    fn undo_at_floor_is_idempotent() {
        let mut store = DocumentStore::new();
        store.commit("a");

        let (_, first) = store.undo();
        assert_eq!(first, UndoStatus::Rewound);

        // Repeated undo keeps returning the initial version unchanged.
        for _ in 0..3 {
            let (version, status) = store.undo();
            assert_eq!(status, UndoStatus::NothingToUndo);
            assert_eq!(version.content, "");
            assert_eq!(version.sequence, 0);
        }
    }

    #[test]
    fn duplicate_then_undo_scenario() {
        // commit("A"), commit("A"), commit("B"), undo()
        let mut store = DocumentStore::new();
        store.commit("A");
        store.commit("A");
        store.commit("B");
        let (version, status) = store.undo();

        assert_eq!(store.version_count(), 2);
        assert_eq!(status, UndoStatus::Rewound);
        assert_eq!(version.content, "A");
        assert_eq!(store.current().content, "A");
    }

    #[test]
    fn commit_after_undo_discards_future_versions() {
        let mut store = DocumentStore::new();
        store.commit("a");
        store.commit("b");
        store.undo();
        store.commit("c");

        assert_eq!(store.current().content, "c");
        assert_eq!(store.version_count(), 2);
        let contents: Vec<&str> = store.history().iter().map(|v| v.content.as_str()).collect();
        assert_eq!(contents, vec!["", "a", "c"]);
    }

    #[test]
    fn sequence_numbers_are_never_reused() {
        let mut store = DocumentStore::new();
        store.commit("a"); // seq 1
        store.commit("b"); // seq 2
        store.undo();
        let seq = store.commit("c"); // discards "b", must not reuse 2
        assert_eq!(seq, 3);
    }

    #[test]
    fn committing_rewound_content_is_still_a_noop() {
        let mut store = DocumentStore::new();
        store.commit("a");
        store.commit("b");
        store.undo();

        // Current is "a" again; committing "a" changes nothing.
        let seq = store.commit("a");
        assert_eq!(seq, 1);
        assert_eq!(store.version_count(), 2);
    }

    #[test]
    fn history_is_ordered_and_append_only() {
        let mut store = DocumentStore::new();
        store.commit("a");
        store.commit("b");
        let sequences: Vec<u64> = store.history().iter().map(|v| v.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }
}
