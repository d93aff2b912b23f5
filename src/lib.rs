//! # ClipView
//!
//! Client-side viewer for a clipboard history service.
//!
//! ClipView polls the service for recorded entries, lets the user search and
//! reorder them, and renders text, images and rich text with inline glyphs.
//! The polling/search arbitration lives in [`sync`], payload expansion in
//! [`content`].

pub mod cli;
pub mod config;
pub mod content;
pub mod history;
pub mod service;
pub mod sync;
pub mod view;

pub use config::Config;
pub use content::{ClipboardContent, ClipboardEntry, EmojiImage, Segment};
pub use sync::SyncController;

/// Result type alias for ClipView operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ClipView operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// History service error
    #[error("History service error: {0}")]
    Service(#[from] service::ServiceError),

    /// Sync controller error
    #[error("Sync error: {0}")]
    Sync(#[from] sync::SyncError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] view::ClipboardError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
