//! History service contract
//!
//! The capture service owns recording and search. The viewer only talks to
//! it through [`HistoryService`], whose two calls mirror the service's
//! request/response commands.

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::ClipboardEntry;

pub use file::FileHistoryService;
pub use memory::MemoryHistoryService;

/// Errors returned by a history service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// IO error reading the history source
    #[error("Failed to read history source: {0}")]
    Io(#[from] std::io::Error),

    /// History data did not match the entry format
    #[error("Malformed history data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Service could not answer
    #[error("History service unavailable: {0}")]
    Unavailable(String),
}

/// Source of clipboard history
#[async_trait]
pub trait HistoryService: Send + Sync {
    /// Full current history, oldest first
    async fn get_clipboard_history(&self) -> Result<Vec<ClipboardEntry>, ServiceError>;

    /// Entries matching `query`
    ///
    /// Callers never send an empty query here; the unfiltered call is used
    /// instead.
    async fn search_clipboard_history(
        &self,
        query: &str,
    ) -> Result<Vec<ClipboardEntry>, ServiceError>;
}

/// Case-insensitive substring filter used by the bundled services
///
/// Images never match. An empty query keeps every entry.
pub fn filter_entries(entries: &[ClipboardEntry], query: &str) -> Vec<ClipboardEntry> {
    if query.is_empty() {
        return entries.to_vec();
    }

    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            entry
                .content
                .searchable_text()
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}
