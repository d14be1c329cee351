//! Waitpoint: a thread-synchronization toolkit built around two primitives.
//!
//! # Overview
//!
//! - [`Latch`]: one-shot countdown gate. N [`Latch::arrive`] signals release
//!   all waiters exactly once; waiters park on a condition variable instead
//!   of spinning.
//! - [`BoundedChannel`]: fixed-capacity multi-producer/multi-consumer
//!   hand-off buffer with blocking `put`/`take`, predicate-aware
//!   `take_matching`, and broadcast wake-all so waiters on heterogeneous
//!   predicates never starve behind each other.
//!
//! Both primitives are leaf components over shared memory: one exclusive
//! critical section per instance, no dependency on each other, no
//! cross-instance locking.
//!
//! # Cancellation
//!
//! Every blocking operation takes a [`CancelToken`] and fails with
//! `ErrorKind::Cancelled` once the token is triggered, leaving the
//! primitive's state unchanged. Cancellation is cooperative and observed
//! only at suspension points; nothing forcibly stops a running thread.
//!
//! # Example
//!
//! ```
//! use waitpoint::{BoundedChannel, CancelToken, Latch};
//!
//! let cancel = CancelToken::new();
//! let channel = BoundedChannel::new(4)?;
//! channel.put(&cancel, 7).map_err(waitpoint::Error::from)?;
//! assert_eq!(channel.take(&cancel).map_err(waitpoint::Error::from)?, 7);
//!
//! let latch = Latch::new(1);
//! latch.arrive();
//! latch.wait(&cancel)?;
//! # Ok::<(), waitpoint::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod channel;
pub mod error;
pub mod latch;
pub mod test_utils;

pub use cancel::CancelToken;
pub use channel::{BoundedChannel, PutError, TakeError};
pub use error::{Error, ErrorKind, Result};
pub use latch::Latch;
