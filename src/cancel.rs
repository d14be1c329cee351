//! Explicit shared cancellation signaling.
//!
//! A [`CancelToken`] is the only cancellation mechanism in the toolkit:
//! blocking operations check it at their suspension points and fail with
//! `ErrorKind::Cancelled` once it has been triggered. There is no forced
//! termination of a running thread, and no process-global shutdown flag;
//! the owner of a background task hands it a clone of the token and later
//! cancels it for a deterministic shutdown.
//!
//! Cancellation is one-shot: once triggered, a token stays cancelled for
//! the rest of its life, and every clone observes the same state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Cloneable handle to a shared cancellation flag.
///
/// All clones observe the same flag; cancelling any one cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Idempotent: later calls are no-ops. Waiters blocked in toolkit
    /// operations observe the request within their next wake.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::trace!("cancel token triggered");
        }
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Checks for cancellation, failing if it has been requested.
    ///
    /// Blocking operations call this at every wake; application loops can
    /// call it between units of work:
    ///
    /// ```
    /// use waitpoint::CancelToken;
    ///
    /// fn drain(items: &[u64], cancel: &CancelToken) -> waitpoint::Result<u64> {
    ///     let mut sum = 0;
    ///     for item in items {
    ///         cancel.checkpoint()?;
    ///         sum += item;
    ///     }
    ///     Ok(sum)
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error with kind `ErrorKind::Cancelled` once the token
    /// has been triggered.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::cancelled());
        }
        Ok(())
    }
}
