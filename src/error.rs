//! Error types and error handling strategy for settle.
//!
//! Two kinds of failure exist in this crate and they are kept apart:
//!
//! - **Rejections** are values. A promise rejects with its own `E`, and that
//!   reason flows through chains, combinators, and `catch` handlers untouched.
//!   Rejections never become an [`Error`].
//! - **Runtime errors** are [`Error`]s: observing a pending promise, driving
//!   the loop past its step limit, adopting a promise into itself, invalid
//!   configuration, or reporting unhandled rejections.
//!
//! # Error Categories
//!
//! - **Settlement**: observing or resolving promises incorrectly
//! - **Scheduling**: the event loop could not make the requested progress
//! - **Configuration**: invalid loop configuration or environment overrides
//! - **Internal**: runtime bugs and invalid states

use core::fmt;
use std::sync::Arc;

use crate::types::PromiseId;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Settlement ===
    /// Tried to observe the outcome of a promise that is still pending.
    NotSettled,
    /// A promise was resolved with itself.
    ChainingCycle,
    /// One or more rejections were never handled.
    UnhandledRejection,

    // === Scheduling ===
    /// The loop executed more tasks than its configured step limit.
    StepLimitExceeded,

    // === Configuration ===
    /// A configuration value could not be parsed or is out of range.
    InvalidConfig,

    // === Internal ===
    /// Internal runtime error (bug).
    Internal,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotSettled | Self::ChainingCycle | Self::UnhandledRejection => {
                ErrorCategory::Settlement
            }
            Self::StepLimitExceeded => ErrorCategory::Scheduling,
            Self::InvalidConfig => ErrorCategory::Configuration,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Returns true if this kind reports a programming error in the caller.
    ///
    /// These should fail fast in tests rather than be retried or ignored.
    #[must_use]
    pub const fn is_programming_error(&self) -> bool {
        matches!(self, Self::NotSettled | Self::ChainingCycle)
    }
}

/// High-level error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Promise observation and resolution failures.
    Settlement,
    /// Event loop progress failures.
    Scheduling,
    /// Configuration failures.
    Configuration,
    /// Internal runtime errors.
    Internal,
}

/// The main error type for settle operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    promise: Option<PromiseId>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            promise: None,
            source: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Records the promise the error is about.
    #[must_use]
    pub const fn with_promise(mut self, promise: PromiseId) -> Self {
        self.promise = Some(promise);
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the promise the error is about, if any.
    #[must_use]
    pub const fn promise(&self) -> Option<PromiseId> {
        self.promise
    }

    /// Returns true if this error reports observing a pending promise.
    #[must_use]
    pub const fn is_not_settled(&self) -> bool {
        matches!(self.kind, ErrorKind::NotSettled)
    }

    /// Creates a settlement error for a promise that is still pending.
    #[must_use]
    pub fn not_settled(promise: PromiseId) -> Self {
        Self::new(ErrorKind::NotSettled)
            .with_message(format!("{promise} is still pending"))
            .with_promise(promise)
    }

    /// Creates a chaining cycle error for a promise resolved with itself.
    #[must_use]
    pub fn chaining_cycle(promise: PromiseId) -> Self {
        Self::new(ErrorKind::ChainingCycle)
            .with_message(format!("{promise} cannot adopt itself"))
            .with_promise(promise)
    }

    /// Creates a step limit error.
    #[must_use]
    pub fn step_limit_exceeded(limit: u64) -> Self {
        Self::new(ErrorKind::StepLimitExceeded)
            .with_message(format!("event loop exceeded {limit} steps"))
    }

    /// Creates an internal error (runtime bug).
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal).with_message(detail)
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

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(e: crate::config::ConfigError) -> Self {
        Self::new(ErrorKind::InvalidConfig)
            .with_message(e.to_string())
            .with_source(e)
    }
}

/// Extension trait for adding context to Results.
#[allow(clippy::result_large_err)]
pub trait ResultExt<T> {
    /// Attach a context message on error.
    fn context(self, msg: impl Into<String>) -> Result<T>;
    /// Attach context message computed lazily on error.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_message(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().with_message(f()))
    }
}

/// A specialized Result type for settle operations.
#[allow(clippy::result_large_err)]
pub type Result<T> = core::result::Result<T, Error>;
