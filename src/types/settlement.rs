//! Settled outcomes and promise states.
//!
//! A promise is in exactly one [`PromiseState`]. Once it leaves `Pending` it
//! carries a [`Settlement`]:
//!
//! - `Fulfilled { value }`: the producer delivered a value
//! - `Rejected { reason }`: the producer (or a reaction) failed with a reason
//!
//! `Settlement` is also the per-member record produced by
//! [`all_settled`](crate::combinator::all_settled). Its serde form is the
//! familiar tagged record:
//!
//! ```text
//! {"status":"fulfilled","value":1}
//! {"status":"rejected","reason":"x"}
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

/// The observable lifecycle state of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseState {
    /// Not yet settled.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a rejection reason.
    Rejected,
}

impl PromiseState {
    /// Returns true if the promise is no longer pending.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Fulfilled => f.write_str("fulfilled"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// The final outcome of a settled promise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Settlement<T, E> {
    /// The promise fulfilled.
    Fulfilled {
        /// The fulfillment value.
        value: T,
    },
    /// The promise rejected.
    Rejected {
        /// The rejection reason.
        reason: E,
    },
}

impl<T, E> Settlement<T, E> {
    /// Creates a fulfilled settlement.
    pub const fn fulfilled(value: T) -> Self {
        Self::Fulfilled { value }
    }

    /// Creates a rejected settlement.
    pub const fn rejected(reason: E) -> Self {
        Self::Rejected { reason }
    }

    /// Returns the state this settlement puts a promise in.
    #[must_use]
    pub const fn state(&self) -> PromiseState {
        match self {
            Self::Fulfilled { .. } => PromiseState::Fulfilled,
            Self::Rejected { .. } => PromiseState::Rejected,
        }
    }

    /// Returns true if this settlement is a fulfillment.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    /// Returns true if this settlement is a rejection.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Borrows the fulfillment value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled { value } => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    /// Borrows the rejection reason, if any.
    #[must_use]
    pub const fn reason(&self) -> Option<&E> {
        match self {
            Self::Fulfilled { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Fulfilled { value } => Ok(value),
            Self::Rejected { reason } => Err(reason),
        }
    }

    /// Maps the fulfillment value using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Settlement<U, E> {
        match self {
            Self::Fulfilled { value } => Settlement::Fulfilled { value: f(value) },
            Self::Rejected { reason } => Settlement::Rejected { reason },
        }
    }

    /// Maps the rejection reason using the provided function.
    pub fn map_err<F2, G: FnOnce(E) -> F2>(self, g: G) -> Settlement<T, F2> {
        match self {
            Self::Fulfilled { value } => Settlement::Fulfilled { value },
            Self::Rejected { reason } => Settlement::Rejected { reason: g(reason) },
        }
    }

    /// Returns the fulfillment value or panics.
    ///
    /// # Panics
    ///
    /// Panics if the settlement is a rejection.
    #[track_caller]
    pub fn unwrap(self) -> T
    where
        E: fmt::Debug,
    {
        match self {
            Self::Fulfilled { value } => value,
            Self::Rejected { reason } => {
                panic!("called `Settlement::unwrap()` on a rejection: {reason:?}")
            }
        }
    }

    /// Returns the rejection reason or panics.
    ///
    /// # Panics
    ///
    /// Panics if the settlement is a fulfillment.
    #[track_caller]
    pub fn unwrap_rejected(self) -> E
    where
        T: fmt::Debug,
    {
        match self {
            Self::Fulfilled { value } => {
                panic!("called `Settlement::unwrap_rejected()` on a fulfillment: {value:?}")
            }
            Self::Rejected { reason } => reason,
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled { value },
            Err(reason) => Self::Rejected { reason },
        }
    }
}
