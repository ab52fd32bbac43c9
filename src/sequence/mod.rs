//! Lazy sequences: generators as explicit state machines.
//!
//! A [`LazySequence`] wraps a [`Coroutine`] and tracks where it is:
//!
//! ```text
//! Suspended { resumed: n } ──next()──▶ Suspended { resumed: n + 1 }   (Yielded)
//!          │
//!          └──next() / finish(r)──▶ Completed                          (Returned)
//!
//! Completed ──next()──▶ Completed                                      (Exhausted)
//! ```
//!
//! The terminal return value is reported once by [`LazySequence::next`] and
//! never surfaces through [`Iterator`]:
//!
//! ```
//! use settle::sequence::{self, NextResult};
//!
//! let values: Vec<i32> = sequence::scripted([1, 2], 3).collect();
//! assert_eq!(values, [1, 2]);
//!
//! let mut seq = sequence::scripted([1, 2], 3);
//! assert_eq!(seq.next(), NextResult::Yielded(1));
//! assert_eq!(seq.next(), NextResult::Yielded(2));
//! assert_eq!(seq.next(), NextResult::Returned(3));
//! assert_eq!(seq.next(), NextResult::Exhausted);
//! ```

mod coroutine;

pub use coroutine::{Coroutine, FromFn, Resume, Scripted};

use core::fmt;
use std::iter::FusedIterator;

use crate::tracing_compat::trace;

/// Result of advancing a [`LazySequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextResult<Y, R> {
    /// The sequence suspended after producing a value.
    Yielded(Y),
    /// The sequence completed on this call with a terminal value.
    Returned(R),
    /// The sequence had already completed.
    Exhausted,
}

impl<Y, R> NextResult<Y, R> {
    /// Returns true if the sequence is completed after this step.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        !matches!(self, Self::Yielded(_))
    }

    /// Returns the yielded value, if any.
    #[must_use]
    pub fn yielded(self) -> Option<Y> {
        match self {
            Self::Yielded(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the terminal value, if this step completed the sequence.
    #[must_use]
    pub fn returned(self) -> Option<R> {
        match self {
            Self::Returned(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> NextResult<T, T> {
    /// Borrows the value carried by this step, yielded or returned. `None`
    /// once exhausted.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Yielded(value) | Self::Returned(value) => Some(value),
            Self::Exhausted => None,
        }
    }

    /// Splits into `(value, completed)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, bool) {
        let completed = self.is_completed();
        match self {
            Self::Yielded(value) | Self::Returned(value) => (Some(value), completed),
            Self::Exhausted => (None, true),
        }
    }
}

enum SequenceState<C> {
    Suspended { coroutine: C, resumed: u64 },
    Completed,
}

/// A single-pass sequence produced on demand by a [`Coroutine`].
///
/// Nothing runs until the first [`next`](Self::next). Once completed it stays
/// completed.
pub struct LazySequence<C> {
    state: SequenceState<C>,
}

impl<C: Coroutine> LazySequence<C> {
    /// Wraps a coroutine, suspended before its first step.
    #[must_use]
    pub const fn new(coroutine: C) -> Self {
        Self {
            state: SequenceState::Suspended {
                coroutine,
                resumed: 0,
            },
        }
    }

    /// Advances to the next yield or to completion.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> NextResult<C::Yield, C::Return> {
        match std::mem::replace(&mut self.state, SequenceState::Completed) {
            SequenceState::Suspended {
                mut coroutine,
                resumed,
            } => match coroutine.resume() {
                Resume::Yield(value) => {
                    self.state = SequenceState::Suspended {
                        coroutine,
                        resumed: resumed + 1,
                    };
                    NextResult::Yielded(value)
                }
                Resume::Complete(value) => {
                    trace!(resumed = resumed + 1, "sequence completed");
                    NextResult::Returned(value)
                }
            },
            SequenceState::Completed => NextResult::Exhausted,
        }
    }

    /// Stops the sequence early with `value`.
    ///
    /// Returns `Returned(value)` if it was still running, `Exhausted` if it
    /// had already completed. The coroutine is dropped without resuming.
    pub fn finish(&mut self, value: C::Return) -> NextResult<C::Yield, C::Return> {
        match std::mem::replace(&mut self.state, SequenceState::Completed) {
            SequenceState::Suspended { resumed, .. } => {
                trace!(resumed, "sequence finished early");
                NextResult::Returned(value)
            }
            SequenceState::Completed => NextResult::Exhausted,
        }
    }

    /// Returns true once the sequence has completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.state, SequenceState::Completed)
    }

    /// Number of times the coroutine has been resumed, or `None` once
    /// completed.
    #[must_use]
    pub const fn resumed(&self) -> Option<u64> {
        match &self.state {
            SequenceState::Suspended { resumed, .. } => Some(*resumed),
            SequenceState::Completed => None,
        }
    }
}

impl<C: Coroutine> Iterator for LazySequence<C> {
    type Item = C::Yield;

    fn next(&mut self) -> Option<Self::Item> {
        Self::next(self).yielded()
    }
}

impl<C: Coroutine> FusedIterator for LazySequence<C> {}

impl<C> fmt::Debug for LazySequence<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            SequenceState::Suspended { resumed, .. } => f
                .debug_struct("LazySequence")
                .field("state", &"suspended")
                .field("resumed", resumed)
                .finish(),
            SequenceState::Completed => f
                .debug_struct("LazySequence")
                .field("state", &"completed")
                .finish(),
        }
    }
}

/// Builds a sequence from explicit state and a step function.
///
/// ```
/// use settle::sequence::{self, Resume};
///
/// let evens = sequence::from_fn(0, |n: &mut u32| {
///     *n += 2;
///     if *n <= 6 { Resume::Yield(*n) } else { Resume::Complete(()) }
/// });
/// assert_eq!(evens.collect::<Vec<_>>(), [2, 4, 6]);
/// ```
pub fn from_fn<S, Y, R, F>(state: S, step: F) -> LazySequence<FromFn<S, F>>
where
    F: FnMut(&mut S) -> Resume<Y, R>,
{
    LazySequence::new(FromFn::new(state, step))
}

/// Builds a sequence that yields `yields` in order, then returns `ret`.
pub fn scripted<Y, R: Clone>(
    yields: impl IntoIterator<Item = Y>,
    ret: R,
) -> LazySequence<Scripted<Y, R>> {
    LazySequence::new(Scripted::new(yields, ret))
}
