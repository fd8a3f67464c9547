//! Countdown driver.
//!
//! The ticker polls several times per nominal second and reports how many
//! whole seconds have passed on the wall clock since the last report. It
//! counts timestamps, not polls, so a stalled or suspended process catches
//! up in a single report instead of drifting.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::clock::Clock;

/// Default polling period: ten polls per nominal second.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Converts wall-clock timestamps into whole elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedTracker {
    reference_ms: i64,
}

impl ElapsedTracker {
    pub fn new(now_ms: i64) -> Self {
        Self { reference_ms: now_ms }
    }

    /// Returns the whole seconds elapsed since the reference, if at least one.
    ///
    /// The reference moves forward by exactly the reported seconds so the
    /// sub-second remainder carries into the next report.
    pub fn poll(&mut self, now_ms: i64) -> Option<u64> {
        let delta = now_ms - self.reference_ms;
        if delta < 0 {
            // Clock moved backwards; start counting again from here.
            self.reference_ms = now_ms;
            return None;
        }
        let secs = delta / 1000;
        if secs == 0 {
            return None;
        }
        self.reference_ms += secs * 1000;
        Some(secs as u64)
    }
}

/// Tokio-driven polling loop around an [`ElapsedTracker`].
pub struct Ticker {
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            poll_interval: DEFAULT_POLL_INTERVAL,
            handle: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Begin polling. `on_elapsed` receives the number of whole seconds that
    /// passed since the previous call (normally 1).
    ///
    /// Must be called from within a tokio runtime. A running ticker is
    /// restarted.
    pub fn start<F>(&mut self, mut on_elapsed: F)
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.stop();
        let clock = Arc::clone(&self.clock);
        let period = self.poll_interval;
        let mut tracker = ElapsedTracker::new(clock.now_ms());

        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if let Some(secs) = tracker.poll(clock.now_ms()) {
                    on_elapsed(secs);
                }
            }
        }));
        tracing::debug!(poll_ms = period.as_millis() as u64, "Ticker started");
    }

    /// Cancel future callbacks. No-op when not started.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Ticker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
