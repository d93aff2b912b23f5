//! Interactive terminal history viewer

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use futures_util::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::config::Config;
use crate::content::ClipboardEntry;
use crate::sync::{SyncController, SyncEvent, SyncMode, SyncState};
use crate::view::{
    copy_entry, ClipboardSink, CopyAffordance, CopyOutcome, PresentationView, Rendered, SortOrder,
    EMPTY_STATE,
};

pub struct HistoryViewer {
    controller: SyncController,
    sink: Arc<dyn ClipboardSink>,
    view: PresentationView,
    poll_interval: Duration,
    preview_width: usize,
    selected_index: usize,
    query: String,
    status: Option<String>,
    /// Last fetch failure, cleared once a fetch lands again
    fetch_error: Option<String>,
}

enum ViewerAction {
    Continue,
    Exit,
}

impl HistoryViewer {
    pub fn new(controller: SyncController, sink: Arc<dyn ClipboardSink>, config: &Config) -> Self {
        Self {
            controller,
            sink,
            view: PresentationView::new(SortOrder::from_descending(config.view.descending)),
            poll_interval: config.sync.poll_interval(),
            preview_width: config.view.preview_width,
            selected_index: 0,
            query: String::new(),
            status: None,
            fetch_error: None,
        }
    }

    /// Mount the viewer and run until the user exits
    ///
    /// The terminal and the poller are both released when this returns,
    /// including on error.
    pub async fn run(&mut self) -> Result<()> {
        let _terminal = TerminalGuard::enter()?;
        let _poller = self.controller.start_polling(self.poll_interval)?;

        let mut keys = EventStream::new();
        let mut updates = self.controller.subscribe();

        self.draw().await?;

        loop {
            tokio::select! {
                event = keys.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let ViewerAction::Exit = self.handle_key_event(key).await? {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                update = updates.recv() => match update {
                    Ok(event) => self.apply_sync_event(event),
                    Err(RecvError::Lagged(count)) => {
                        debug!("Viewer lagged by {} sync events", count);
                    }
                    Err(RecvError::Closed) => break,
                },
            }

            self.draw().await?;
        }

        Ok(())
    }

    fn apply_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::SnapshotReplaced { entries, .. } => {
                self.selected_index = self.selected_index.min(entries.saturating_sub(1));
                self.fetch_error = None;
            }
            SyncEvent::FetchFailed { error, .. } => {
                self.fetch_error = Some(format!("Refresh failed: {}", error));
            }
        }
    }

    /// Status line under the list; user actions take precedence over fetch errors
    fn status_line(&self) -> Option<&str> {
        self.status.as_deref().or(self.fetch_error.as_deref())
    }

    async fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<ViewerAction> {
        match key_event.code {
            KeyCode::Esc => return Ok(ViewerAction::Exit),
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(ViewerAction::Exit);
            }
            KeyCode::Enter => self.copy_selected().await,
            KeyCode::Tab => {
                self.view.toggle_sort();
                self.selected_index = 0;
            }
            KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let count = self.controller.snapshot().await.len();
                if self.selected_index < count.saturating_sub(1) {
                    self.selected_index += 1;
                }
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.update_query().await;
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    self.update_query().await;
                }
            }
            _ => {}
        }

        Ok(ViewerAction::Continue)
    }

    async fn update_query(&mut self) {
        self.selected_index = 0;
        self.status = None;
        // Result arrives through the sync event channel
        let _ = self.controller.set_query(self.query.clone()).await;
    }

    async fn copy_selected(&mut self) {
        let snapshot = self.controller.snapshot().await;
        let Some(entry) = self.view.entry_at(&snapshot, self.selected_index) else {
            return;
        };

        self.status = Some(match copy_entry(entry, self.sink.as_ref()).await {
            Ok(CopyOutcome::Copied) => "Copied to clipboard".to_string(),
            Ok(CopyOutcome::Refused { reason }) => reason.to_string(),
            Err(e) => {
                warn!("Copy failed: {}", e);
                format!("Copy failed: {}", e)
            }
        });
    }

    async fn draw(&self) -> Result<()> {
        let snapshot = self.controller.snapshot().await;
        let state = self.controller.state().await;
        let lines = compose_frame(
            &self.view,
            &snapshot,
            &state,
            self.selected_index,
            self.preview_width,
            self.status_line(),
        );

        let mut stdout = io::stdout();
        queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in lines {
            // Raw mode needs an explicit carriage return
            write!(stdout, "{}\r\n", line)?;
        }
        stdout.flush()?;
        Ok(())
    }
}

/// Lines of one viewer frame
fn compose_frame(
    view: &PresentationView,
    snapshot: &[ClipboardEntry],
    state: &SyncState,
    selected_index: usize,
    width: usize,
    status: Option<&str>,
) -> Vec<String> {
    let order = match view.order() {
        SortOrder::Ascending => "oldest first",
        SortOrder::Descending => "newest first",
    };
    let mode = match state.mode {
        SyncMode::Idle => "live",
        SyncMode::Searching => "searching",
    };

    let mut lines = vec![
        "ClipView History".to_string(),
        "================".to_string(),
        "Type to search, Tab to reorder, ↑/↓ to navigate, Enter to copy, Esc to exit".to_string(),
        format!("Search: {}  [{} | {}]", state.query, mode, order),
        String::new(),
    ];

    match view.render(snapshot) {
        Rendered::Empty => lines.push(EMPTY_STATE.to_string()),
        Rendered::Rows(rows) => {
            for (i, row) in rows.iter().enumerate() {
                let prefix = if i == selected_index { "► " } else { "  " };
                lines.push(format!("{}{} | {}", prefix, row.timestamp, row.preview(width)));

                if i == selected_index {
                    if let CopyAffordance::Disabled { reason } = row.copy {
                        lines.push(format!("    copy unavailable: {}", reason));
                    }
                }
            }
        }
    }

    if let Some(status) = status {
        lines.push(String::new());
        lines.push(status.to_string());
    }

    lines
}

/// Raw mode and alternate screen for the lifetime of the guard
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ClipboardContent;
    use crate::service::MemoryHistoryService;
    use crate::sync::FetchRequest;
    use crate::view::ClipboardError;
    use async_trait::async_trait;

    struct NullSink;

    #[async_trait]
    impl ClipboardSink for NullSink {
        async fn set_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Ok(())
        }
    }

    fn viewer() -> HistoryViewer {
        let controller = SyncController::new(Arc::new(MemoryHistoryService::new()), true);
        HistoryViewer::new(controller, Arc::new(NullSink), &Config::default())
    }

    fn entries() -> Vec<ClipboardEntry> {
        vec![
            ClipboardEntry::new(ClipboardContent::text("hello"), "10:00"),
            ClipboardEntry::new(ClipboardContent::image("data:image/png;base64,AA"), "10:01"),
        ]
    }

    #[test]
    fn test_frame_shows_empty_state() {
        let lines = compose_frame(
            &PresentationView::default(),
            &[],
            &SyncState::default(),
            0,
            80,
            None,
        );
        assert_eq!(lines.last().map(String::as_str), Some(EMPTY_STATE));
    }

    #[test]
    fn test_frame_marks_selection_and_disabled_copy() {
        let view = PresentationView::new(SortOrder::Descending);
        let lines = compose_frame(&view, &entries(), &SyncState::default(), 0, 80, None);

        assert!(lines.contains(&"► 10:01 | [image]".to_string()));
        assert!(lines.contains(&"    copy unavailable: Images cannot be copied".to_string()));
        assert!(lines.contains(&"  10:00 | hello".to_string()));
    }

    #[test]
    fn test_frame_shows_query_and_status() {
        let state = SyncState {
            query: "hel".to_string(),
            mode: SyncMode::Searching,
        };
        let lines = compose_frame(
            &PresentationView::default(),
            &entries(),
            &state,
            0,
            80,
            Some("Copied to clipboard"),
        );

        assert!(lines.contains(&"Search: hel  [searching | oldest first]".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Copied to clipboard"));
    }

    #[test]
    fn test_fetch_error_clears_after_recovery() {
        let mut viewer = viewer();
        viewer.apply_sync_event(SyncEvent::FetchFailed {
            seq: 1,
            request: FetchRequest::All,
            error: "service down".to_string(),
        });
        assert_eq!(viewer.status_line(), Some("Refresh failed: service down"));

        viewer.apply_sync_event(SyncEvent::SnapshotReplaced {
            seq: 2,
            revision: 1,
            entries: 3,
            request: FetchRequest::All,
        });
        assert_eq!(viewer.status_line(), None);
    }

    #[test]
    fn test_copy_status_outlives_snapshot_replacement() {
        let mut viewer = viewer();
        viewer.status = Some("Copied to clipboard".to_string());
        viewer.apply_sync_event(SyncEvent::SnapshotReplaced {
            seq: 1,
            revision: 1,
            entries: 0,
            request: FetchRequest::All,
        });
        assert_eq!(viewer.status_line(), Some("Copied to clipboard"));
        assert_eq!(viewer.selected_index, 0);
    }
}
