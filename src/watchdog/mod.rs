//! Deadline for busy operations
//!
//! Every busy operation arms the watchdog. If the operation is still busy when
//! the deadline passes, the watchdog resets the shared flags, tells the UI once
//! and cancels the operation's token so the worker abandons its stream.


use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::VoxError;
use crate::state::{BusyGuard, RuntimeState};
use crate::ui::{UiEvent, UiSink};

pub const DEFAULT_WATCHDOG_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct Watchdog {
    state: Arc<RuntimeState>,
    ui: Arc<dyn UiSink>,
    timeout: Duration,
}

impl Watchdog {
    pub fn new(state: Arc<RuntimeState>, ui: Arc<dyn UiSink>, timeout: Duration) -> Self {
        Self { state, ui, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start the deadline for the operation holding `busy`.
    ///
    /// Must be called from within a tokio runtime. Dropping the returned guard
    /// cancels the timer.
    pub fn arm(&self, busy: &BusyGuard) -> WatchdogGuard {
        let disarm = CancellationToken::new();
        let fired = Arc::new(AtomicBool::new(false));

        let op = busy.op();
        let op_cancel = busy.cancel_token();
        let state = Arc::clone(&self.state);
        let ui = Arc::clone(&self.ui);
        let timeout = self.timeout;
        let disarmed = disarm.clone();
        let fired_flag = Arc::clone(&fired);

        tokio::spawn(async move {
            tokio::select! {
                _ = disarmed.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    if !state.is_busy_with(op) {
                        tracing::debug!(op, "Watchdog expired after operation finished");
                        return;
                    }
                    tracing::warn!(op, timeout_secs = timeout.as_secs(), "Operation timed out, forcing reset");
                    fired_flag.store(true, Ordering::SeqCst);
                    state.force_reset();
                    op_cancel.cancel();
                    ui.notify(UiEvent::Error(VoxError::Timeout(timeout.as_secs()).user_message()));
                    ui.notify(UiEvent::Reset);
                }
            }
        });

        WatchdogGuard { disarm, fired }
    }
}

/// Cancels the watchdog timer on drop
pub struct WatchdogGuard {
    disarm: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl WatchdogGuard {
    /// Whether the deadline passed and the reset ran
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Whether the timer is still pending
    pub fn is_armed(&self) -> bool {
        !self.disarm.is_cancelled() && !self.fired()
    }
}

impl Drop for WatchdogGuard {
    fn drop(&mut self) {
        self.disarm.cancel();
    }
}
