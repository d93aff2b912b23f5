use async_trait::async_trait;
use chrono::Local;
use tokio::sync::RwLock;
use tracing::debug;

use super::{filter_entries, HistoryService, ServiceError};
use crate::content::{ClipboardContent, ClipboardEntry};

/// Timestamp layout used for recorded entries
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// In-process history service
///
/// Keeps entries in recording order and answers both service calls from
/// memory.
#[derive(Debug, Default)]
pub struct MemoryHistoryService {
    entries: RwLock<Vec<ClipboardEntry>>,
}

impl MemoryHistoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service pre-populated with entries
    pub fn with_entries(entries: Vec<ClipboardEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Record new content stamped with the local time
    ///
    /// Empty content and content equal to the latest entry are not
    /// recorded. Returns whether an entry was added.
    pub async fn record(&self, content: ClipboardContent) -> bool {
        if content.is_empty() {
            debug!("Skipping empty {} entry", content.kind());
            return false;
        }

        let mut entries = self.entries.write().await;

        if entries.last().is_some_and(|last| last.content == content) {
            debug!("Skipping duplicate {} entry", content.kind());
            return false;
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        entries.push(ClipboardEntry::new(content, timestamp));
        true
    }

    /// Append an entry as-is
    pub async fn push(&self, entry: ClipboardEntry) {
        self.entries.write().await.push(entry);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl HistoryService for MemoryHistoryService {
    async fn get_clipboard_history(&self) -> Result<Vec<ClipboardEntry>, ServiceError> {
        Ok(self.entries.read().await.clone())
    }

    async fn search_clipboard_history(
        &self,
        query: &str,
    ) -> Result<Vec<ClipboardEntry>, ServiceError> {
        Ok(filter_entries(&self.entries.read().await, query))
    }
}
