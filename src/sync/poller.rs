//! Interval task that drives controller ticks

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::{SyncController, TickOutcome};

/// Owned periodic poll task
///
/// The first tick fires immediately. The task is aborted when the handle is
/// stopped or dropped, whichever comes first. Fetches already dispatched
/// are left to complete.
pub struct PollHandle {
    handle: Option<JoinHandle<()>>,
    active: Arc<AtomicBool>,
    period: Duration,
}

impl PollHandle {
    pub(super) fn spawn(
        controller: SyncController,
        active: Arc<AtomicBool>,
        period: Duration,
    ) -> Self {
        info!("Polling history every {:?}", period);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if let TickOutcome::Dispatched(pending) = controller.tick().await {
                    debug!("Poll tick dispatched fetch #{}", pending.seq());
                }
            }
        });

        Self {
            handle: Some(handle),
            active,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel the poll task
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.active.store(false, Ordering::SeqCst);
            debug!("Polling stopped");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
