//! Native theme-sync tick as a cancellable scheduled task.
//!
//! The task is owned by whoever owns the embedding surface; dropping the handle cancels
//! the tick, so its lifetime never outlives the surface.

use std::time::Duration;

use timeline_core::{HostProbe, ThemeState, ThemeSync, ThemeSyncConfig, TickSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub struct ThemeSyncTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<ThemeSync>>,
    state: watch::Receiver<ThemeState>,
}

impl ThemeSyncTask {
    /// Start ticking against `probe`: once immediately, then every `interval_ms`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P>(probe: P, config: &ThemeSyncConfig) -> Self
    where
        P: HostProbe + Send + 'static,
    {
        let (tx, rx) = watch::channel(ThemeState::Uninitialized);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = Duration::from_millis(u64::from(config.interval_ms.max(1)));
        let mut sync = ThemeSync::new(config.fallback);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let outcome = sync.tick(&probe);
                        if let TickSource::Ambient { error, prefers_dark } = &outcome.source {
                            trace!(%error, prefers_dark, "host background unreadable");
                        }
                        if outcome.changed {
                            debug!(state = ?outcome.state, "embedded theme changed");
                        }
                        tx.send_if_modified(|state| {
                            let modified = *state != outcome.state;
                            *state = outcome.state;
                            modified
                        });
                    }
                }
            }

            debug!(ticks = sync.ticks(), "theme sync stopped");
            sync
        });

        Self {
            cancel,
            handle: Some(handle),
            state: rx,
        }
    }

    pub fn state(&self) -> ThemeState {
        *self.state.borrow()
    }

    /// Receiver notified whenever the state changes.
    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.state.clone()
    }

    /// Cancel the tick and wait for it, returning the final state machine.
    pub async fn shutdown(mut self) -> Option<ThemeSync> {
        self.cancel.cancel();
        let handle = self.handle.take()?;
        handle.await.ok()
    }
}

impl Drop for ThemeSyncTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
