//! What a reaction returns.

use core::fmt;

use super::Promise;
use crate::types::Settlement;

/// The result of a reaction callback, deciding how the derived promise
/// settles.
///
/// - `Value(v)`: fulfill with `v`
/// - `Throw(e)`: reject with `e`
/// - `Adopt(p)`: follow `p` and settle however it eventually settles
pub enum Step<T, E> {
    /// Fulfill the derived promise.
    Value(T),
    /// Reject the derived promise.
    Throw(E),
    /// Flatten: settle the derived promise like this one.
    Adopt(Promise<T, E>),
}

impl<T, E> From<Result<T, E>> for Step<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(reason) => Self::Throw(reason),
        }
    }
}

impl<T, E> From<Settlement<T, E>> for Step<T, E> {
    fn from(settlement: Settlement<T, E>) -> Self {
        match settlement {
            Settlement::Fulfilled { value } => Self::Value(value),
            Settlement::Rejected { reason } => Self::Throw(reason),
        }
    }
}

impl<T, E> From<Promise<T, E>> for Step<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        Self::Adopt(promise)
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Step<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Throw(e) => f.debug_tuple("Throw").field(e).finish(),
            Self::Adopt(p) => f.debug_tuple("Adopt").field(&p.id()).finish(),
        }
    }
}
