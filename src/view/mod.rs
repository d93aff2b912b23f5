//! Presentation of the history snapshot
//!
//! The view never touches the store. It derives a display order from a
//! snapshot, expands each entry into segments and decides which entries may
//! be copied.

pub mod clipboard;

use crate::content::{ClipboardContent, ClipboardEntry, ContentKind, Segment};

pub use clipboard::{copy_entry, ArboardSink, ClipboardError, ClipboardSink, CopyOutcome};

/// Text shown instead of an empty list
pub const EMPTY_STATE: &str = "No clipboard history";

/// Display order of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Service order, oldest first
    #[default]
    Ascending,
    /// Reversed, newest first
    Descending,
}

impl SortOrder {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Whether the copy action is available for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAffordance {
    Enabled,
    Disabled { reason: &'static str },
}

impl CopyAffordance {
    pub fn for_content(content: &ClipboardContent) -> Self {
        match content {
            ClipboardContent::Text { .. } => CopyAffordance::Enabled,
            ClipboardContent::Image { .. } => CopyAffordance::Disabled {
                reason: "Images cannot be copied",
            },
            ClipboardContent::RichText { .. } => CopyAffordance::Disabled {
                reason: "Rich text cannot be copied as plain text",
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, CopyAffordance::Enabled)
    }
}

/// One rendered history row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub timestamp: String,
    pub kind: ContentKind,
    pub segments: Vec<Segment>,
    pub copy: CopyAffordance,
}

impl EntryRow {
    fn from_entry(entry: &ClipboardEntry) -> Self {
        Self {
            timestamp: entry.timestamp.clone(),
            kind: entry.content.kind(),
            segments: entry.content.expand(),
            copy: CopyAffordance::for_content(&entry.content),
        }
    }

    /// Single-line text rendering, truncated to `width` characters
    pub fn preview(&self, width: usize) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text { value } => {
                    for c in value.chars() {
                        match c {
                            '\n' => line.push(' '),
                            '\r' => {}
                            c => line.push(c),
                        }
                    }
                }
                Segment::Glyph { .. } => line.push('◆'),
                Segment::Image {
                    width: Some(w),
                    height: Some(h),
                    ..
                } => line.push_str(&format!("[image {}x{}]", w, h)),
                Segment::Image { .. } => line.push_str("[image]"),
            }
        }

        if line.chars().count() > width {
            let mut truncated: String = line.chars().take(width).collect();
            truncated.push_str("...");
            truncated
        } else {
            line
        }
    }
}

/// Rendered view of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Nothing to show; render [`EMPTY_STATE`]
    Empty,
    Rows(Vec<EntryRow>),
}

/// Derives what the user sees from the current snapshot
#[derive(Debug, Clone, Default)]
pub struct PresentationView {
    order: SortOrder,
}

impl PresentationView {
    pub fn new(order: SortOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Flip the display order
    pub fn toggle_sort(&mut self) -> SortOrder {
        self.order = self.order.toggled();
        self.order
    }

    /// Entries in display order
    pub fn derive<'a>(&self, snapshot: &'a [ClipboardEntry]) -> Vec<&'a ClipboardEntry> {
        let mut entries: Vec<_> = snapshot.iter().collect();
        if self.order == SortOrder::Descending {
            entries.reverse();
        }
        entries
    }

    /// Entry shown at display row `row`
    pub fn entry_at<'a>(
        &self,
        snapshot: &'a [ClipboardEntry],
        row: usize,
    ) -> Option<&'a ClipboardEntry> {
        let index = match self.order {
            SortOrder::Ascending => row,
            SortOrder::Descending => snapshot.len().checked_sub(row + 1)?,
        };
        snapshot.get(index)
    }

    pub fn render(&self, snapshot: &[ClipboardEntry]) -> Rendered {
        if snapshot.is_empty() {
            return Rendered::Empty;
        }

        Rendered::Rows(
            self.derive(snapshot)
                .into_iter()
                .map(EntryRow::from_entry)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::EmojiImage;
    use pretty_assertions::assert_eq;

    fn snapshot() -> Vec<ClipboardEntry> {
        vec![
            ClipboardEntry::new(ClipboardContent::text("first"), "t1"),
            ClipboardEntry::new(ClipboardContent::image("data:image/png;base64,AA"), "t2"),
            ClipboardEntry::new(
                ClipboardContent::rich_text("hi[emoji-marker]", vec![EmojiImage {
                    data: "G".to_string(),
                    position: 2,
                }]),
                "t3",
            ),
        ]
    }

    fn stamps(entries: &[&ClipboardEntry]) -> Vec<String> {
        entries.iter().map(|e| e.timestamp.clone()).collect()
    }

    #[test]
    fn test_descending_reverses_display_only() {
        let entries = snapshot();
        let mut view = PresentationView::default();

        assert_eq!(stamps(&view.derive(&entries)), vec!["t1", "t2", "t3"]);
        view.toggle_sort();
        assert_eq!(stamps(&view.derive(&entries)), vec!["t3", "t2", "t1"]);
        assert_eq!(entries, snapshot());
    }

    #[test]
    fn test_toggle_twice_restores_order() {
        let entries = snapshot();
        let mut view = PresentationView::new(SortOrder::Descending);
        let before = stamps(&view.derive(&entries));

        view.toggle_sort();
        view.toggle_sort();

        assert_eq!(view.order(), SortOrder::Descending);
        assert_eq!(stamps(&view.derive(&entries)), before);
    }

    #[test]
    fn test_entry_at_follows_display_order() {
        let entries = snapshot();
        let view = PresentationView::new(SortOrder::Descending);

        assert_eq!(view.entry_at(&entries, 0).unwrap().timestamp, "t3");
        assert_eq!(view.entry_at(&entries, 2).unwrap().timestamp, "t1");
        assert!(view.entry_at(&entries, 3).is_none());
    }

    #[test]
    fn test_empty_snapshot_renders_empty_state() {
        assert_eq!(PresentationView::default().render(&[]), Rendered::Empty);
    }

    #[test]
    fn test_copy_affordance_per_kind() {
        let Rendered::Rows(rows) = PresentationView::default().render(&snapshot()) else {
            panic!("expected rows");
        };

        assert!(rows[0].copy.is_enabled());
        assert_eq!(rows[1].copy, CopyAffordance::Disabled {
            reason: "Images cannot be copied"
        });
        assert!(!rows[2].copy.is_enabled());
    }

    #[test]
    fn test_preview_flattens_and_marks_glyphs() {
        let Rendered::Rows(rows) = PresentationView::default().render(&snapshot()) else {
            panic!("expected rows");
        };

        assert_eq!(rows[1].preview(80), "[image]");
        assert_eq!(rows[2].preview(80), "hi◆");

        let row = EntryRow::from_entry(&ClipboardEntry::new(
            ClipboardContent::text("line one\r\nline two"),
            "t",
        ));
        assert_eq!(row.preview(80), "line one line two");
        assert_eq!(row.preview(4), "line...");
    }
}
