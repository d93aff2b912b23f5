//! Rich text expansion
//!
//! Rich text arrives as a string holding literal marker substrings plus a
//! side list of glyph images keyed by the character offset of their marker.
//! Expansion turns that pair into an ordered list of segments a renderer can
//! walk without further lookups.

use serde::Serialize;

use super::EmojiImage;

/// Literal placeholder recorded in rich text where a glyph was captured
pub const EMOJI_MARKER: &str = "[emoji-marker]";

/// Renderable piece of an expanded payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    /// Run of plain text
    Text { value: String },
    /// Inline glyph matched to a marker
    Glyph { image: String },
    /// Whole-entry image
    Image {
        data: String,
        width: Option<u32>,
        height: Option<u32>,
    },
}

enum Piece<'a> {
    Text(&'a str),
    Marker,
}

/// Expand rich text into segments
///
/// Markers with a glyph at their offset become [`Segment::Glyph`]; markers
/// without one stay in the output as literal text. Adjacent text runs are
/// merged, so content with no matched glyph yields a single text segment.
/// Glyphs whose position matches no marker are ignored. When two glyphs
/// claim the same offset the first one in `emoji_images` wins.
pub fn expand_rich_text(content: &str, emoji_images: &[EmojiImage]) -> Vec<Segment> {
    let marker_len = EMOJI_MARKER.chars().count();
    let mut segments = Vec::new();
    let mut cursor = 0usize;

    for piece in split_keep_marker(content) {
        match piece {
            Piece::Text(text) => {
                push_text(&mut segments, text);
                cursor += text.chars().count();
            }
            Piece::Marker => {
                match emoji_images.iter().find(|image| image.position == cursor) {
                    Some(image) => segments.push(Segment::Glyph {
                        image: image.data.clone(),
                    }),
                    None => push_text(&mut segments, EMOJI_MARKER),
                }
                cursor += marker_len;
            }
        }
    }

    segments
}

fn split_keep_marker(content: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for (start, _) in content.match_indices(EMOJI_MARKER) {
        if start > last {
            pieces.push(Piece::Text(&content[last..start]));
        }
        pieces.push(Piece::Marker);
        last = start + EMOJI_MARKER.len();
    }

    if last < content.len() {
        pieces.push(Piece::Text(&content[last..]));
    }

    pieces
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if let Some(Segment::Text { value }) = segments.last_mut() {
        value.push_str(text);
    } else {
        segments.push(Segment::Text {
            value: text.to_string(),
        });
    }
}
