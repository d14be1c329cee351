//! Bounded multi-producer/multi-consumer hand-off buffer.
//!
//! The channel distinguishes three wait conditions that a single shared
//! notification channel would conflate: capacity available (blocked `put`),
//! any item available (blocked `take`), and a *matching* item available
//! (blocked `take_matching`). Because waiters wait on heterogeneous
//! predicates, every state-changing operation wakes **all** waiters and each
//! waiter re-checks its own predicate after every wake. Waking a single
//! arbitrary waiter risks perpetual starvation of the one whose predicate
//! the wakeup does not satisfy; broadcast trades a few wasted wakeups for
//! eliminating that class of bug.
//!
//! All state lives behind one mutex per instance. No operation holds the
//! lock across a notification, and no operation touches a second instance,
//! so the channel introduces no deadlock paths of its own.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind};

/// Upper bound on one condvar park, so cancellation is observed promptly.
const WAKE_SLICE: Duration = Duration::from_millis(10);

/// Error when inserting into the channel.
///
/// The rejected item is handed back in every variant; a failed `put` never
/// loses the value.
#[derive(Debug, PartialEq, Eq)]
pub enum PutError<T> {
    /// Channel is at capacity (non-blocking attempt only).
    Full(T),
    /// The wait for capacity was cancelled.
    Cancelled(T),
    /// The wait for capacity timed out.
    TimedOut(T),
}

impl<T> PutError<T> {
    /// Returns the item that was not inserted.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Cancelled(item) | Self::TimedOut(item) => item,
        }
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "channel full"),
            Self::Cancelled(_) => write!(f, "put cancelled"),
            Self::TimedOut(_) => write!(f, "put timed out"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for PutError<T> {}

impl<T> From<PutError<T>> for Error {
    fn from(e: PutError<T>) -> Self {
        match e {
            PutError::Full(_) => Self::new(ErrorKind::ChannelFull),
            PutError::Cancelled(_) => Self::new(ErrorKind::Cancelled),
            PutError::TimedOut(_) => Self::new(ErrorKind::TimedOut),
        }
    }
}

/// Error when removing from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeError {
    /// Channel holds no (matching) item (non-blocking attempt only).
    Empty,
    /// The wait for an item was cancelled.
    Cancelled,
    /// The wait for an item timed out.
    TimedOut,
}

impl fmt::Display for TakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "channel empty"),
            Self::Cancelled => write!(f, "take cancelled"),
            Self::TimedOut => write!(f, "take timed out"),
        }
    }
}

impl std::error::Error for TakeError {}

impl From<TakeError> for Error {
    fn from(e: TakeError) -> Self {
        match e {
            TakeError::Empty => Self::new(ErrorKind::ChannelEmpty),
            TakeError::Cancelled => Self::new(ErrorKind::Cancelled),
            TakeError::TimedOut => Self::new(ErrorKind::TimedOut),
        }
    }
}

/// Fixed-capacity FIFO buffer with blocking, cancel-aware insert/remove.
///
/// The channel owns stored items between `put` and the matching take;
/// insertion order is preserved, and `len() <= capacity()` holds at every
/// observable instant. An insert that would exceed capacity blocks rather
/// than drops.
pub struct BoundedChannel<T> {
    capacity: usize,
    items: Mutex<VecDeque<T>>,
    /// Single notification channel; broadcast on every state change.
    state_changed: Condvar,
}

impl<T> fmt::Debug for BoundedChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedChannel")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> BoundedChannel<T> {
    /// Creates a channel holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns an error with kind `ErrorKind::InvalidArgument` if
    /// `capacity == 0`.
    pub fn new(capacity: usize) -> crate::error::Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_argument("channel capacity must be positive"));
        }
        Ok(Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            state_changed: Condvar::new(),
        })
    }

    /// Returns the fixed capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of items currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().expect("channel lock poisoned").len()
    }

    /// Returns true if no items are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the channel is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Appends `item` at the tail, blocking while the channel is full.
    ///
    /// On success all waiters are woken so that every blocked taker
    /// re-checks its own predicate.
    ///
    /// # Errors
    ///
    /// Returns `PutError::Cancelled(item)` if `cancel` is triggered before
    /// space becomes available; the channel is left unchanged and the item
    /// is handed back.
    pub fn put(&self, cancel: &CancelToken, item: T) -> Result<(), PutError<T>> {
        self.put_inner(cancel, item, None)
    }

    /// Like [`put`](Self::put), but gives up once `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns `PutError::TimedOut(item)` if no space became available
    /// within the bound, or `PutError::Cancelled(item)` on cancellation.
    pub fn put_timeout(
        &self,
        cancel: &CancelToken,
        item: T,
        timeout: Duration,
    ) -> Result<(), PutError<T>> {
        self.put_inner(cancel, item, Some(Instant::now() + timeout))
    }

    /// Attempts to append `item` without blocking.
    ///
    /// # Errors
    ///
    /// Returns `PutError::Full(item)` if the channel is at capacity.
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        let mut items = self.items.lock().expect("channel lock poisoned");
        if items.len() == self.capacity {
            return Err(PutError::Full(item));
        }
        items.push_back(item);
        drop(items);
        self.state_changed.notify_all();
        Ok(())
    }

    fn put_inner(
        &self,
        cancel: &CancelToken,
        item: T,
        deadline: Option<Instant>,
    ) -> Result<(), PutError<T>> {
        let mut items = self.items.lock().expect("channel lock poisoned");
        loop {
            // Re-validate on every wake: another producer may have claimed
            // the freed slot between the notification and this lock.
            if items.len() < self.capacity {
                items.push_back(item);
                drop(items);
                self.state_changed.notify_all();
                return Ok(());
            }

            if cancel.checkpoint().is_err() {
                tracing::trace!("put cancelled while waiting for capacity");
                return Err(PutError::Cancelled(item));
            }

            let Some(slice) = wait_slice(deadline) else {
                tracing::trace!("put timed out waiting for capacity");
                return Err(PutError::TimedOut(item));
            };
            let (guard, _) = self
                .state_changed
                .wait_timeout(items, slice)
                .expect("channel lock poisoned");
            items = guard;
        }
    }

    /// Removes and returns the head item, blocking while the channel is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns `TakeError::Cancelled` if `cancel` is triggered before an
    /// item becomes available; the channel is left unchanged.
    pub fn take(&self, cancel: &CancelToken) -> Result<T, TakeError> {
        self.take_where(cancel, None, |_| true)
    }

    /// Like [`take`](Self::take), but gives up once `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns `TakeError::TimedOut` if the channel stayed empty for the
    /// whole bound, or `TakeError::Cancelled` on cancellation.
    pub fn take_timeout(&self, cancel: &CancelToken, timeout: Duration) -> Result<T, TakeError> {
        self.take_where(cancel, Some(Instant::now() + timeout), |_| true)
    }

    /// Removes and returns the first item satisfying `matches`, blocking
    /// until one is present.
    ///
    /// Among buffered matches the oldest wins (FIFO among matches); items
    /// that do not match are left untouched. This generalizes plain `take`
    /// (predicate = any) and lets consumers with disjoint interests share
    /// one channel without waking each other into fruitless re-takes.
    ///
    /// # Errors
    ///
    /// Returns `TakeError::Cancelled` if `cancel` is triggered before a
    /// matching item is present; the channel is left unchanged.
    pub fn take_matching<F>(&self, cancel: &CancelToken, matches: F) -> Result<T, TakeError>
    where
        F: FnMut(&T) -> bool,
    {
        self.take_where(cancel, None, matches)
    }

    /// Like [`take_matching`](Self::take_matching), but gives up once
    /// `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns `TakeError::TimedOut` if no matching item appeared within
    /// the bound, or `TakeError::Cancelled` on cancellation.
    pub fn take_matching_timeout<F>(
        &self,
        cancel: &CancelToken,
        matches: F,
        timeout: Duration,
    ) -> Result<T, TakeError>
    where
        F: FnMut(&T) -> bool,
    {
        self.take_where(cancel, Some(Instant::now() + timeout), matches)
    }

    /// Attempts to remove the head item without blocking.
    ///
    /// # Errors
    ///
    /// Returns `TakeError::Empty` if the channel holds no items.
    pub fn try_take(&self) -> Result<T, TakeError> {
        let mut items = self.items.lock().expect("channel lock poisoned");
        match items.pop_front() {
            Some(item) => {
                drop(items);
                self.state_changed.notify_all();
                Ok(item)
            }
            None => Err(TakeError::Empty),
        }
    }

    fn take_where<F>(
        &self,
        cancel: &CancelToken,
        deadline: Option<Instant>,
        mut matches: F,
    ) -> Result<T, TakeError>
    where
        F: FnMut(&T) -> bool,
    {
        let mut items = self.items.lock().expect("channel lock poisoned");
        loop {
            // Re-evaluate the predicate on every wake; an unrelated
            // insertion or a racing consumer may have changed the buffer.
            if let Some(pos) = items.iter().position(&mut matches) {
                let item = items.remove(pos).expect("matched position in bounds");
                drop(items);
                self.state_changed.notify_all();
                return Ok(item);
            }

            if cancel.checkpoint().is_err() {
                tracing::trace!("take cancelled while waiting for a matching item");
                return Err(TakeError::Cancelled);
            }

            let Some(slice) = wait_slice(deadline) else {
                tracing::trace!("take timed out waiting for a matching item");
                return Err(TakeError::TimedOut);
            };
            let (guard, _) = self
                .state_changed
                .wait_timeout(items, slice)
                .expect("channel lock poisoned");
            items = guard;
        }
    }
}

/// Returns the next park duration, or `None` once the deadline has passed.
fn wait_slice(deadline: Option<Instant>) -> Option<Duration> {
    let Some(deadline) = deadline else {
        return Some(WAKE_SLICE);
    };
    let now = Instant::now();
    if now >= deadline {
        return None;
    }
    Some(WAKE_SLICE.min(deadline - now))
}
