//! Background polling of the store.
//!
//! The poller fetches the galaxy on a fixed interval while the host window
//! is visible and focused, and hands each snapshot to the session through
//! a channel. A poll is skipped while the previous result is still waiting
//! to be applied, so snapshots never queue up behind a busy session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use starmap_core::config::SyncConfig;
use starmap_store::{GalaxyStore, StoreError};
use starmap_types::GalaxySnapshot;
use tokio::sync::{Notify, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::session::EditorSession;

/// Whether the host window is visible and focused.
///
/// Shared between the host, which reports changes, and the poller, which
/// only polls while both hold.
#[derive(Debug)]
pub struct Presence {
    visible: AtomicBool,
    focused: AtomicBool,
    changed: Notify,
}

impl Default for Presence {
    fn default() -> Self {
        Self::new()
    }
}

impl Presence {
    /// A window that is visible and focused.
    pub const fn new() -> Self {
        Self {
            visible: AtomicBool::new(true),
            focused: AtomicBool::new(true),
            changed: Notify::const_new(),
        }
    }

    /// Report whether the window is visible.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
        self.changed.notify_one();
    }

    /// Report whether the window has focus.
    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::Release);
        self.changed.notify_one();
    }

    /// Whether polling should run.
    pub fn is_active(&self) -> bool {
        self.visible.load(Ordering::Acquire) && self.focused.load(Ordering::Acquire)
    }

    /// Wait until the window is visible and focused.
    pub async fn wait_until_active(&self) {
        while !self.is_active() {
            self.changed.notified().await;
        }
    }
}

/// Held while a poll result is on its way to the session. The next poll
/// waits for it to be dropped.
#[derive(Debug)]
pub struct PollTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for PollTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// One background fetch, ready to merge.
#[derive(Debug)]
pub struct PollResult {
    /// What the store returned.
    pub snapshot: Result<GalaxySnapshot, StoreError>,
    /// Released once the result has been applied.
    pub ticket: PollTicket,
}

/// Periodic background fetcher.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    presence: Arc<Presence>,
    busy: Arc<AtomicBool>,
}

impl Poller {
    /// A poller on the configured interval.
    pub fn new(config: &SyncConfig, presence: Arc<Presence>) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            presence,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Visibility and focus the poller follows.
    pub const fn presence(&self) -> &Arc<Presence> {
        &self.presence
    }

    /// Whether a result is still waiting to be applied.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_ticket(&self) -> Option<PollTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PollTicket {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Poll until `tx` is closed. The first fetch happens one interval
    /// after the start, the session having just loaded.
    pub async fn run<S: GalaxyStore>(self, store: Arc<S>, tx: mpsc::Sender<PollResult>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = tx.closed() => break,
            }
            if !self.presence.is_active() {
                debug!("window inactive, waiting");
                tokio::select! {
                    () = self.presence.wait_until_active() => {}
                    () = tx.closed() => break,
                }
                ticker.reset();
                continue;
            }
            let Some(ticket) = self.try_ticket() else {
                debug!("previous poll still pending, skipping");
                continue;
            };
            let snapshot = store.fetch().await;
            if tx.send(PollResult { snapshot, ticket }).await.is_err() {
                break;
            }
        }
        debug!("poller stopped");
    }
}

impl EditorSession {
    /// Merge a background poll. Failures are logged and otherwise ignored.
    pub fn apply_poll(&mut self, result: PollResult) {
        let PollResult { snapshot, ticket } = result;
        match snapshot {
            Ok(snapshot) => self.apply_snapshot(snapshot, true),
            Err(e) => warn!(error = %e, "background poll failed"),
        }
        drop(ticket);
    }
}
