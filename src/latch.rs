//! One-shot countdown gate with cancel-aware, non-spinning waits.
//!
//! The latch releases when `count` arrivals have occurred. Waiters park on
//! a condition variable bound to the same critical section as the counter;
//! nobody spins on the count. Release is permanent: once the count reaches
//! zero every current and future `wait` returns immediately.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::error::Result;

/// Upper bound on one condvar park, so cancellation is observed promptly.
const WAKE_SLICE: Duration = Duration::from_millis(10);

/// One-shot gate that releases all waiters after a fixed number of arrivals.
#[derive(Debug)]
pub struct Latch {
    count: Mutex<usize>,
    released: Condvar,
}

impl Latch {
    /// Creates a latch that releases after `count` arrivals.
    ///
    /// A latch created with `count == 0` starts released.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    /// Returns the number of arrivals still required.
    #[must_use]
    pub fn count(&self) -> usize {
        *self.count.lock().expect("latch lock poisoned")
    }

    /// Returns true once the latch has released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.count() == 0
    }

    /// Records one arrival.
    ///
    /// Decrements the remaining count by one; the arrival that brings it to
    /// zero releases all waiters. Arrivals past zero are no-ops, never an
    /// error.
    pub fn arrive(&self) {
        let mut count = self.count.lock().expect("latch lock poisoned");
        if *count == 0 {
            return;
        }
        *count -= 1;
        let released = *count == 0;
        drop(count);

        if released {
            tracing::trace!("latch released");
            self.released.notify_all();
        }
    }

    /// Blocks until the latch releases.
    ///
    /// Returns immediately if the latch is already released. The calling
    /// thread parks between wakes and consumes no CPU while blocked.
    ///
    /// # Errors
    ///
    /// Returns an error with kind `ErrorKind::Cancelled` if `cancel` is
    /// triggered before the latch releases.
    pub fn wait(&self, cancel: &CancelToken) -> Result<()> {
        let mut count = self.count.lock().expect("latch lock poisoned");
        loop {
            if *count == 0 {
                return Ok(());
            }

            cancel.checkpoint()?;

            // Sliced wait: wake periodically to observe cancellation, then
            // re-check the count (spurious wakeups re-check too).
            let (guard, _) = self
                .released
                .wait_timeout(count, WAKE_SLICE)
                .expect("latch lock poisoned");
            count = guard;
        }
    }

    /// Blocks until the latch releases or `timeout` elapses.
    ///
    /// Returns `Ok(true)` if the latch released within the bound and
    /// `Ok(false)` on timeout, with the latch state unchanged either way.
    ///
    /// # Errors
    ///
    /// Returns an error with kind `ErrorKind::Cancelled` if `cancel` is
    /// triggered before the latch releases or the deadline passes.
    pub fn wait_timeout(&self, cancel: &CancelToken, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock().expect("latch lock poisoned");
        loop {
            if *count == 0 {
                return Ok(true);
            }

            cancel.checkpoint()?;

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }

            let slice = WAKE_SLICE.min(deadline - now);
            let (guard, _) = self
                .released
                .wait_timeout(count, slice)
                .expect("latch lock poisoned");
            count = guard;
        }
    }
}
