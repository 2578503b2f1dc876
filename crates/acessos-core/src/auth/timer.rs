//! One-shot inactivity timer.
//!
//! The timer is a tokio task that sleeps once and then reports its
//! generation on a channel. Rearming aborts the previous task and starts a
//! new one with a fresh generation; a fire carrying an old generation is
//! stale and must be ignored by the receiver.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub struct ExpiryTimer {
    handle: JoinHandle<()>,
    generation: u64,
    deadline: Instant,
}

impl ExpiryTimer {
    /// Spawn a timer that sends `generation` once `after` has elapsed.
    pub fn arm(after: Duration, generation: u64, fired: mpsc::UnboundedSender<u64>) -> Self {
        let deadline = Instant::now() + after;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Receiver gone means the controller was torn down
            let _ = fired.send(generation);
        });

        Self {
            handle,
            generation,
            deadline,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// True once the deadline has passed, whether or not the fire was sent.
    pub fn is_due(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn cancel(self) {
        // Drop does the abort
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
