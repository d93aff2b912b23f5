//! Copy-to-clipboard action
//!
//! Only plain text entries can be copied. Other kinds are refused before the
//! system clipboard is touched.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use super::CopyAffordance;
use crate::content::ClipboardEntry;

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// System clipboard could not be opened
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    /// Write to the clipboard failed
    #[error("Failed to copy to clipboard: {0}")]
    CopyFailed(String),
}

/// Destination for copied text
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via arboard
#[derive(Debug, Default)]
pub struct ArboardSink;

impl ArboardSink {
    pub fn new() -> Self {
        Self
    }
}

/// Open the system clipboard and replace its contents; blocks the thread
fn write_system_clipboard(text: String) -> Result<(), ClipboardError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
    let chars = text.chars().count();

    clipboard
        .set_text(text)
        .map_err(|e| ClipboardError::CopyFailed(e.to_string()))?;
    debug!("Wrote {} characters to the system clipboard", chars);
    Ok(())
}

#[async_trait]
impl ClipboardSink for ArboardSink {
    async fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_owned();
        match tokio::task::spawn_blocking(move || write_system_clipboard(text)).await {
            Ok(result) => result,
            Err(e) => Err(ClipboardError::CopyFailed(format!(
                "clipboard writer did not finish: {}",
                e
            ))),
        }
    }
}

/// Result of a copy request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Copy is disabled for this entry; the clipboard was left alone
    Refused { reason: &'static str },
}

/// Copy an entry's text to `sink` if its kind allows it
pub async fn copy_entry(
    entry: &ClipboardEntry,
    sink: &dyn ClipboardSink,
) -> Result<CopyOutcome, ClipboardError> {
    match (CopyAffordance::for_content(&entry.content), entry.content.as_plain_text()) {
        (CopyAffordance::Enabled, Some(text)) => {
            sink.set_text(text).await?;
            info!("Copied entry from {} to clipboard", entry.timestamp);
            Ok(CopyOutcome::Copied)
        }
        (CopyAffordance::Disabled { reason }, _) => {
            debug!("Copy refused for {} entry: {}", entry.content.kind(), reason);
            Ok(CopyOutcome::Refused { reason })
        }
        (CopyAffordance::Enabled, None) => Ok(CopyOutcome::Refused {
            reason: "Entry has no plain text",
        }),
    }
}
