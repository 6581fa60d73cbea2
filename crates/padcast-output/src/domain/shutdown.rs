//! Process-wide cooperative stop flag.
//!
//! # How does shutdown work? (for beginners)
//!
//! Nothing in the client is ever cancelled from the outside.  Instead, the
//! signal listener flips one shared boolean, and every loop that can block for
//! a long time (the message loop and the retry delay) waits in short slices of
//! [`STOP_POLL_INTERVAL`] and looks at the flag between slices.  The worst-case
//! reaction time to Ctrl+C is therefore one slice, and a frame that is being
//! read is never torn in half.
//!
//! The flag is set once and never cleared: after it is observed the process
//! shuts down.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::time::Instant;

/// Longest time any loop waits before checking the flag again.
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Cloneable handle to the shared stop flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown.  Returns `true` for the call that actually set the flag.
    pub fn request(&self) -> bool {
        !self.0.swap(true, Ordering::Relaxed)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sleeps for `duration` in [`STOP_POLL_INTERVAL`] slices.
    ///
    /// Returns `true` if the whole duration elapsed, `false` if shutdown was
    /// requested first.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            tokio::time::sleep((deadline - now).min(STOP_POLL_INTERVAL)).await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
