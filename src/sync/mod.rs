//! Polling and search arbitration
//!
//! [`SyncController`] decides which fetch runs when and which completed fetch
//! may install its result into the [`HistoryStore`]. Polling is suppressed
//! while a search is active. Every request carries a sequence number; a
//! response is installed only if it is newer than the last installed one and
//! no user-driven request (query change or refresh) was issued after it.

mod poller;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::content::ClipboardEntry;
use crate::history::{HistorySnapshot, HistoryStore};
use crate::service::{HistoryService, ServiceError};

pub use poller::PollHandle;

/// Sync controller errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// A poller is already attached to this controller
    #[error("Polling is already running for this controller")]
    AlreadyPolling,
}

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Timer ticks refresh the full history
    #[default]
    Idle,
    /// A query is active; timer ticks are ignored
    Searching,
}

/// Query and mode as seen by the next tick
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncState {
    pub query: String,
    pub mode: SyncMode,
}

/// Request sent to the history service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    All,
    Filtered(String),
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchRequest::All => write!(f, "full history"),
            FetchRequest::Filtered(query) => write!(f, "search {:?}", query),
        }
    }
}

/// Result of a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response installed as the new snapshot
    Applied {
        seq: u64,
        revision: u64,
        entries: usize,
    },
    /// Response arrived after a newer request was issued and was dropped
    Stale { seq: u64 },
    /// Service call failed; snapshot and state untouched
    Failed { seq: u64, error: String },
}

/// Notification published after each completed fetch
#[derive(Debug, Clone)]
pub enum SyncEvent {
    SnapshotReplaced {
        seq: u64,
        revision: u64,
        entries: usize,
        request: FetchRequest,
    },
    FetchFailed {
        seq: u64,
        request: FetchRequest,
        error: String,
    },
}

/// Handle to a dispatched fetch
///
/// Dropping it does not cancel the fetch.
#[derive(Debug)]
pub struct PendingFetch {
    seq: u64,
    handle: JoinHandle<FetchOutcome>,
}

impl PendingFetch {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wait for the fetch to complete
    pub async fn wait(self) -> FetchOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed {
                seq: self.seq,
                error: format!("Fetch task ended abnormally: {}", e),
            },
        }
    }
}

/// What a timer tick did
#[derive(Debug)]
pub enum TickOutcome {
    Dispatched(PendingFetch),
    Suppressed,
}

/// Polling/search state machine
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct SyncController {
    service: Arc<dyn HistoryService>,
    state: Arc<RwLock<SyncState>>,
    store: Arc<RwLock<HistoryStore>>,
    latest_seq: Arc<AtomicU64>,
    /// Requests numbered below this were superseded by a user-driven request
    floor_seq: Arc<AtomicU64>,
    /// Written only while the store lock is held
    applied_seq: Arc<AtomicU64>,
    polling: Arc<AtomicBool>,
    event_sender: broadcast::Sender<SyncEvent>,
    refresh_on_clear: bool,
}

impl SyncController {
    /// Create an idle controller with an empty snapshot
    ///
    /// With `refresh_on_clear`, clearing the query fetches the full history
    /// right away instead of waiting for the next tick.
    pub fn new(service: Arc<dyn HistoryService>, refresh_on_clear: bool) -> Self {
        let (event_sender, _) = broadcast::channel(64);

        Self {
            service,
            state: Arc::new(RwLock::new(SyncState::default())),
            store: Arc::new(RwLock::new(HistoryStore::new())),
            latest_seq: Arc::new(AtomicU64::new(0)),
            floor_seq: Arc::new(AtomicU64::new(0)),
            applied_seq: Arc::new(AtomicU64::new(0)),
            polling: Arc::new(AtomicBool::new(false)),
            event_sender,
            refresh_on_clear,
        }
    }

    /// Handle a timer tick
    ///
    /// Issues an unfiltered fetch while idle. While searching the tick does
    /// nothing at all. Ticks never invalidate earlier polls, so a service
    /// slower than the poll period still gets its responses installed.
    pub async fn tick(&self) -> TickOutcome {
        let state = self.state.read().await;
        if state.mode == SyncMode::Searching {
            debug!("Tick suppressed while searching for {:?}", state.query);
            return TickOutcome::Suppressed;
        }

        let seq = self.next_seq();
        drop(state);

        TickOutcome::Dispatched(self.dispatch(seq, FetchRequest::All))
    }

    /// Update the search query
    ///
    /// A non-empty query enters search mode and issues a filtered fetch. An
    /// empty query returns to idle and invalidates any fetch still in
    /// flight. The new mode is visible to ticks before this returns.
    pub async fn set_query(&self, query: impl Into<String>) -> Option<PendingFetch> {
        let query = query.into();
        let mut state = self.state.write().await;
        let seq = self.next_user_seq();

        if query.is_empty() {
            state.mode = SyncMode::Idle;
            state.query.clear();
            drop(state);

            if self.refresh_on_clear {
                Some(self.dispatch(seq, FetchRequest::All))
            } else {
                debug!("Query cleared, waiting for next tick");
                None
            }
        } else {
            state.mode = SyncMode::Searching;
            state.query = query.clone();
            drop(state);

            Some(self.dispatch(seq, FetchRequest::Filtered(query)))
        }
    }

    /// Fetch for the current mode right away
    pub async fn refresh(&self) -> PendingFetch {
        let state = self.state.read().await;
        let request = match state.mode {
            SyncMode::Idle => FetchRequest::All,
            SyncMode::Searching => FetchRequest::Filtered(state.query.clone()),
        };
        let seq = self.next_user_seq();
        drop(state);

        self.dispatch(seq, request)
    }

    /// Attach the periodic poller
    ///
    /// Only one poller may be attached at a time; it detaches when the
    /// returned handle is stopped or dropped.
    pub fn start_polling(&self, period: Duration) -> Result<PollHandle, SyncError> {
        if self.polling.swap(true, Ordering::SeqCst) {
            return Err(SyncError::AlreadyPolling);
        }

        Ok(PollHandle::spawn(self.clone(), Arc::clone(&self.polling), period))
    }

    pub async fn state(&self) -> SyncState {
        self.state.read().await.clone()
    }

    pub async fn mode(&self) -> SyncMode {
        self.state.read().await.mode
    }

    pub async fn snapshot(&self) -> HistorySnapshot {
        self.store.read().await.snapshot()
    }

    pub async fn revision(&self) -> u64 {
        self.store.read().await.revision()
    }

    /// Sequence number of the most recently issued request
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq.load(Ordering::SeqCst)
    }

    pub fn is_polling(&self) -> bool {
        self.polling.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_sender.subscribe()
    }

    fn next_seq(&self) -> u64 {
        self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Allocate a sequence number that supersedes everything issued before it
    fn next_user_seq(&self) -> u64 {
        let seq = self.next_seq();
        self.floor_seq.fetch_max(seq, Ordering::SeqCst);
        seq
    }

    fn is_superseded(&self, seq: u64) -> bool {
        seq < self.floor_seq.load(Ordering::SeqCst)
            || seq <= self.applied_seq.load(Ordering::SeqCst)
    }

    fn dispatch(&self, seq: u64, request: FetchRequest) -> PendingFetch {
        debug!("Dispatching fetch #{}: {}", seq, request);

        let controller = self.clone();
        let handle = tokio::spawn(async move {
            let result = match &request {
                FetchRequest::All => controller.service.get_clipboard_history().await,
                FetchRequest::Filtered(query) => {
                    controller.service.search_clipboard_history(query).await
                }
            };
            controller.complete(seq, request, result).await
        });

        PendingFetch { seq, handle }
    }

    async fn complete(
        &self,
        seq: u64,
        request: FetchRequest,
        result: Result<Vec<ClipboardEntry>, ServiceError>,
    ) -> FetchOutcome {
        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                let error = e.to_string();
                if self.is_superseded(seq) {
                    debug!("Superseded fetch #{} ({}) failed: {}", seq, request, error);
                } else {
                    warn!("Fetch #{} ({}) failed: {}", seq, request, error);
                    let _ = self.event_sender.send(SyncEvent::FetchFailed {
                        seq,
                        request,
                        error: error.clone(),
                    });
                }
                return FetchOutcome::Failed { seq, error };
            }
        };

        let mut store = self.store.write().await;
        if self.is_superseded(seq) {
            debug!(
                "Discarding stale response #{} ({}); latest is #{}",
                seq,
                request,
                self.latest_seq()
            );
            return FetchOutcome::Stale { seq };
        }

        let count = entries.len();
        let revision = store.replace(entries);
        self.applied_seq.store(seq, Ordering::SeqCst);
        drop(store);

        debug!("Installed {} entries from fetch #{}", count, seq);
        let _ = self.event_sender.send(SyncEvent::SnapshotReplaced {
            seq,
            revision,
            entries: count,
            request,
        });

        FetchOutcome::Applied {
            seq,
            revision,
            entries: count,
        }
    }
}
