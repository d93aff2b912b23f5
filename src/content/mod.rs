//! Clipboard payload model
//!
//! These types are the wire contract shared with the capture service. The
//! `type` discriminator and the per-variant fields must stay exactly as they
//! are serialized here.

mod expand;

use serde::{Deserialize, Serialize};

pub use expand::{expand_rich_text, Segment, EMOJI_MARKER};

/// A single recorded clipboard entry
///
/// Entries carry no stable identity; an entry is addressed by its position
/// in the snapshot it was fetched with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    /// Recorded payload
    pub content: ClipboardContent,
    /// Capture time as formatted by the service
    pub timestamp: String,
}

impl ClipboardEntry {
    /// Create a new entry
    pub fn new(content: ClipboardContent, timestamp: impl Into<String>) -> Self {
        Self {
            content,
            timestamp: timestamp.into(),
        }
    }
}

/// Payload of a clipboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClipboardContent {
    /// Plain text
    Text { content: String },

    /// Encoded image, usually a data URI
    Image {
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },

    /// Text with inline glyphs captured out of band
    RichText {
        content: String,
        #[serde(default)]
        emoji_images: Vec<EmojiImage>,
    },
}

/// Inline glyph captured alongside rich text
///
/// `position` is the character offset of the marker occurrence this glyph
/// replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiImage {
    pub data: String,
    pub position: usize,
}

/// Content kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Image,
    RichText,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Text => write!(f, "text"),
            ContentKind::Image => write!(f, "image"),
            ContentKind::RichText => write!(f, "rich text"),
        }
    }
}

impl ClipboardContent {
    /// Create plain text content
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Create image content without size hints
    pub fn image(data: impl Into<String>) -> Self {
        Self::Image {
            data: data.into(),
            width: None,
            height: None,
        }
    }

    /// Create rich text content
    pub fn rich_text(content: impl Into<String>, emoji_images: Vec<EmojiImage>) -> Self {
        Self::RichText {
            content: content.into(),
            emoji_images,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ClipboardContent::Text { .. } => ContentKind::Text,
            ClipboardContent::Image { .. } => ContentKind::Image,
            ClipboardContent::RichText { .. } => ContentKind::RichText,
        }
    }

    /// Text eligible for a plain-text copy
    ///
    /// Only `Text` content qualifies.
    pub fn as_plain_text(&self) -> Option<&str> {
        match self {
            ClipboardContent::Text { content } => Some(content),
            ClipboardContent::Image { .. } | ClipboardContent::RichText { .. } => None,
        }
    }

    /// Text a search query is matched against
    pub fn searchable_text(&self) -> Option<&str> {
        match self {
            ClipboardContent::Text { content } | ClipboardContent::RichText { content, .. } => {
                Some(content)
            }
            ClipboardContent::Image { .. } => None,
        }
    }

    /// Whether there is nothing to show: an empty string or image payload
    pub fn is_empty(&self) -> bool {
        match self {
            ClipboardContent::Text { content } | ClipboardContent::RichText { content, .. } => {
                content.is_empty()
            }
            ClipboardContent::Image { data, .. } => data.is_empty(),
        }
    }

    /// Expand the payload into renderable segments
    pub fn expand(&self) -> Vec<Segment> {
        match self {
            ClipboardContent::Text { content } => vec![Segment::Text {
                value: content.clone(),
            }],
            ClipboardContent::Image {
                data,
                width,
                height,
            } => vec![Segment::Image {
                data: data.clone(),
                width: *width,
                height: *height,
            }],
            ClipboardContent::RichText {
                content,
                emoji_images,
            } => expand_rich_text(content, emoji_images),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_text_wire_format() {
        let entry = ClipboardEntry::new(ClipboardContent::text("hello"), "2024-01-01 10:00:00");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "content": { "type": "Text", "content": "hello" },
                "timestamp": "2024-01-01 10:00:00"
            })
        );
    }

    #[test]
    fn test_image_omits_missing_dimensions() {
        let value =
            serde_json::to_value(ClipboardContent::image("data:image/png;base64,AA")).unwrap();
        assert_eq!(value, json!({ "type": "Image", "data": "data:image/png;base64,AA" }));
    }

    #[test]
    fn test_rich_text_from_service_json() {
        let raw = r#"{
            "type": "RichText",
            "content": "hi[emoji-marker]",
            "emoji_images": [{ "data": "X", "position": 2 }]
        }"#;
        let content: ClipboardContent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            content,
            ClipboardContent::rich_text("hi[emoji-marker]", vec![EmojiImage {
                data: "X".to_string(),
                position: 2,
            }])
        );
        assert_eq!(content.kind(), ContentKind::RichText);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let raw = r#"{ "type": "Html", "content": "<b>x</b>" }"#;
        assert!(serde_json::from_str::<ClipboardContent>(raw).is_err());
    }

    #[test]
    fn test_plain_text_only_for_text() {
        assert_eq!(ClipboardContent::text("a").as_plain_text(), Some("a"));
        assert_eq!(ClipboardContent::image("d").as_plain_text(), None);
        assert_eq!(ClipboardContent::rich_text("r", vec![]).as_plain_text(), None);
        assert_eq!(ClipboardContent::rich_text("r", vec![]).searchable_text(), Some("r"));
    }

    #[test]
    fn test_is_empty() {
        assert!(ClipboardContent::text("").is_empty());
        assert!(ClipboardContent::rich_text("", vec![]).is_empty());
        assert!(!ClipboardContent::rich_text("[emoji-marker]", vec![]).is_empty());
        assert!(!ClipboardContent::image("d").is_empty());
    }

    #[test]
    fn test_expand_image_keeps_size_hints() {
        let content = ClipboardContent::Image {
            data: "D".to_string(),
            width: Some(16),
            height: Some(9),
        };
        assert_eq!(
            content.expand(),
            vec![Segment::Image {
                data: "D".to_string(),
                width: Some(16),
                height: Some(9),
            }]
        );
    }
}
