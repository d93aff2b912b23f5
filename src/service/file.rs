use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{filter_entries, HistoryService, ServiceError};
use crate::content::ClipboardEntry;

/// History service backed by a JSON export
///
/// The file holds a JSON array of entries in wire format and is re-read on
/// every call, so external writers are picked up on the next poll.
#[derive(Debug, Clone)]
pub struct FileHistoryService {
    path: PathBuf,
}

impl FileHistoryService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ClipboardEntry>, ServiceError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("History file {} not found, treating as empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl HistoryService for FileHistoryService {
    async fn get_clipboard_history(&self) -> Result<Vec<ClipboardEntry>, ServiceError> {
        self.load().await
    }

    async fn search_clipboard_history(
        &self,
        query: &str,
    ) -> Result<Vec<ClipboardEntry>, ServiceError> {
        let entries = self.load().await?;
        Ok(filter_entries(&entries, query))
    }
}
