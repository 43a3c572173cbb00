// src/usage/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::UsageSync;

/// Handle to the recurring usage sync. Dropping it leaves the task running;
/// call [`SyncSchedule::stop`] to deregister.
pub struct SyncSchedule {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl SyncSchedule {
    /// Deregister the schedule. A run already in flight completes before
    /// this returns; no further tick fires.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(target: "usage", error = %e, "usage sync task ended abnormally");
        }
        tracing::info!(target: "usage", "usage sync schedule cleared");
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Run `sync` now and then every `interval`. Ticks never overlap: a slow run
/// delays the next one instead of stacking.
pub fn spawn_usage_sync(sync: Arc<UsageSync>, interval: Duration) -> SyncSchedule {
    tracing::info!(target: "usage", interval_secs = interval.as_secs(), "usage sync scheduled");
    let (shutdown, mut stop_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // Only the wait is interruptible. A dropped handle closes the
            // channel, which disables the stop branch and keeps ticking.
            tokio::select! {
                biased;
                Ok(()) = stop_rx.changed() => break,
                _ = ticker.tick() => {}
            }
            sync.run().await;
            if *stop_rx.borrow() {
                break;
            }
        }
    });
    SyncSchedule { handle, shutdown }
}
