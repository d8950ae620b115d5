//! Idle Sweep
//!
//! Workflows and views are opened by UI surfaces that may disappear
//! without closing them. Each session records when it was last used and
//! a background task closes the ones left idle past a timeout, which
//! stops their polling loops.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// When a session was last used.
#[derive(Debug)]
pub struct LastSeen(Mutex<Instant>);

impl LastSeen {
    /// Start the clock now.
    #[must_use]
    pub fn now() -> Self {
        Self(Mutex::new(Instant::now()))
    }

    /// Record a use.
    pub fn touch(&self) {
        *self.0.lock() = Instant::now();
    }

    /// Time since the last use.
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.0.lock())
    }
}

/// How often the sweep runs for a given idle timeout.
#[must_use]
pub fn sweep_period(idle_timeout: Duration) -> Duration {
    (idle_timeout / 2).max(Duration::from_secs(1))
}

/// Run `sweep` every [`sweep_period`] until `shutdown` is cancelled.
///
/// `sweep` returns the number of sessions it closed, or `None` once the
/// registry it sweeps is gone.
pub fn spawn_idle_sweep<F>(
    kind: &'static str,
    idle_timeout: Duration,
    shutdown: CancellationToken,
    mut sweep: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Option<usize> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_period(idle_timeout));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::debug!(kind, idle_timeout_secs = idle_timeout.as_secs(), "Idle sweep started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match sweep() {
                        Some(0) => {}
                        Some(closed) => tracing::info!(kind, closed, "Closed idle sessions"),
                        None => break,
                    }
                }
                () = shutdown.cancelled() => break,
            }
        }
        tracing::debug!(kind, "Idle sweep stopped");
    })
}
