//! Error types and error handling strategy for the toolkit.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Blocking operations report cancellation and timeout as errors, never
//!   as silent success
//! - Non-blocking operations report "would block" instead of waiting
//! - No operation retries internally; retry policy belongs to the caller

use core::fmt;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An out-of-range argument was passed at construction.
    InvalidArgument,
    /// A blocking wait was cancelled before its condition was satisfied.
    Cancelled,
    /// A timed blocking wait reached its deadline.
    TimedOut,
    /// Channel is full (would block).
    ChannelFull,
    /// Channel is empty or holds no matching item (would block).
    ChannelEmpty,
}

impl ErrorKind {
    /// Returns true if this kind indicates a transient would-block state
    /// that a later attempt may clear.
    #[must_use]
    pub const fn is_would_block(&self) -> bool {
        matches!(self, Self::ChannelFull | Self::ChannelEmpty)
    }
}

/// The main error type for toolkit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this error represents cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Returns true if this error represents an expired deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::TimedOut)
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Creates an invalid-argument error with a detail message.
    #[must_use]
    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument).with_message(detail)
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timed_out() -> Self {
        Self::new(ErrorKind::TimedOut)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// A specialized Result type for toolkit operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_message() {
        let err = Error::new(ErrorKind::Cancelled);
        assert_eq!(err.to_string(), "Cancelled");
    }

    #[test]
    fn display_with_message() {
        let err = Error::new(ErrorKind::InvalidArgument).with_message("capacity must be positive");
        assert_eq!(err.to_string(), "InvalidArgument: capacity must be positive");
    }

    #[test]
    fn predicates_match_kind() {
        let cancel = Error::cancelled();
        assert!(cancel.is_cancelled());
        assert!(!cancel.is_timeout());

        let timeout = Error::timed_out();
        assert!(!timeout.is_cancelled());
        assert!(timeout.is_timeout());
    }

    #[test]
    fn would_block_kinds() {
        assert!(ErrorKind::ChannelFull.is_would_block());
        assert!(ErrorKind::ChannelEmpty.is_would_block());
        assert!(!ErrorKind::Cancelled.is_would_block());
    }
}
