//! Coroutines: explicit state machines that suspend at each yield.

use core::fmt;

/// What a coroutine produced when resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume<Y, R> {
    /// Suspended after producing a value.
    Yield(Y),
    /// Finished with a terminal value.
    Complete(R),
}

/// A resumable computation.
///
/// Each call to [`resume`](Self::resume) runs from the last suspension point
/// to the next one. Callers stop resuming after `Complete`; resuming a
/// completed coroutine is a logic error whose result is up to the
/// implementation. [`LazySequence`](super::LazySequence) never does it.
pub trait Coroutine {
    /// Type of yielded values.
    type Yield;
    /// Type of the terminal value.
    type Return;

    /// Runs to the next suspension point.
    fn resume(&mut self) -> Resume<Self::Yield, Self::Return>;
}

impl<C: Coroutine + ?Sized> Coroutine for Box<C> {
    type Yield = C::Yield;
    type Return = C::Return;

    fn resume(&mut self) -> Resume<Self::Yield, Self::Return> {
        (**self).resume()
    }
}

/// A coroutine driven by a step function over explicit state.
///
/// Built by [`from_fn`](super::from_fn).
pub struct FromFn<S, F> {
    state: S,
    step: F,
}

impl<S, F> FromFn<S, F> {
    /// Creates a coroutine that calls `step` on `state` at every resume.
    pub const fn new(state: S, step: F) -> Self {
        Self { state, step }
    }

    /// Borrows the current state.
    pub const fn state(&self) -> &S {
        &self.state
    }
}

impl<S, F, Y, R> Coroutine for FromFn<S, F>
where
    F: FnMut(&mut S) -> Resume<Y, R>,
{
    type Yield = Y;
    type Return = R;

    fn resume(&mut self) -> Resume<Y, R> {
        (self.step)(&mut self.state)
    }
}

impl<S: fmt::Debug, F> fmt::Debug for FromFn<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").field("state", &self.state).finish()
    }
}

/// Yields a fixed list of values, then completes with a fixed return value.
///
/// The suspension point is an explicit cursor into the list. Built by
/// [`scripted`](super::scripted).
#[derive(Debug, Clone)]
pub struct Scripted<Y, R> {
    yields: Vec<Option<Y>>,
    cursor: usize,
    ret: R,
}

impl<Y, R> Scripted<Y, R> {
    /// Creates a coroutine that yields `yields` in order, then returns `ret`.
    pub fn new(yields: impl IntoIterator<Item = Y>, ret: R) -> Self {
        Self {
            yields: yields.into_iter().map(Some).collect(),
            cursor: 0,
            ret,
        }
    }

    /// Index of the next value to yield.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of values left to yield.
    pub fn remaining(&self) -> usize {
        self.yields.len().saturating_sub(self.cursor)
    }
}

impl<Y, R: Clone> Coroutine for Scripted<Y, R> {
    type Yield = Y;
    type Return = R;

    fn resume(&mut self) -> Resume<Y, R> {
        while let Some(slot) = self.yields.get_mut(self.cursor) {
            self.cursor += 1;
            if let Some(value) = slot.take() {
                return Resume::Yield(value);
            }
        }
        Resume::Complete(self.ret.clone())
    }
}
