//! Client-side cache of the latest fetched history
//!
//! The store only supports wholesale replacement. Every successful fetch,
//! polled or searched, swaps the snapshot for the new sequence.

use std::sync::Arc;

use crate::content::ClipboardEntry;

/// Ordered entries as last returned by the service
pub type HistorySnapshot = Arc<[ClipboardEntry]>;

/// In-memory history snapshot holder
#[derive(Debug, Clone)]
pub struct HistoryStore {
    snapshot: HistorySnapshot,
    revision: u64,
}

impl HistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            snapshot: Arc::from(Vec::new()),
            revision: 0,
        }
    }

    /// Replace the whole snapshot
    ///
    /// Returns the new revision.
    pub fn replace(&mut self, entries: Vec<ClipboardEntry>) -> u64 {
        self.snapshot = Arc::from(entries);
        self.revision += 1;
        self.revision
    }

    /// Cheap handle to the current snapshot
    pub fn snapshot(&self) -> HistorySnapshot {
        Arc::clone(&self.snapshot)
    }

    /// Number of replacements applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
