//! The settling side of a promise.

use std::fmt;
use std::rc::Rc;

use super::shared::PromiseShared;
use super::{Promise, Step};
use crate::error::{Error, Result};
use crate::tracing_compat::{error, trace};
use crate::types::{PromiseId, Settlement};

/// Settles one promise. Handed to executors by [`Promise::new`].
///
/// Resolvers can be cloned and moved into timers or other callbacks. Only the
/// first settling call across all clones has any effect; the rest return
/// `false`.
pub struct Resolver<T, E> {
    shared: Rc<PromiseShared<T, E>>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T, E> Resolver<T, E> {
    pub(crate) fn from_shared(shared: Rc<PromiseShared<T, E>>) -> Self {
        Self { shared }
    }

    /// Returns the ID of the promise this resolver settles.
    #[must_use]
    pub fn promise_id(&self) -> PromiseId {
        self.shared.id()
    }

    /// Returns true once the promise is settled or locked onto another
    /// promise.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.shared.is_locked()
    }
}

impl<T, E> Resolver<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Fulfills the promise. Returns false if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.shared.settle(Settlement::Fulfilled { value })
    }

    /// Rejects the promise. Returns false if it was already settled.
    pub fn reject(&self, reason: E) -> bool {
        self.shared.settle(Settlement::Rejected { reason })
    }

    /// Settles the promise with an outcome.
    pub fn settle(&self, outcome: Settlement<T, E>) -> bool {
        self.shared.settle(outcome)
    }

    /// Locks the promise onto `other`: it will settle however `other`
    /// eventually settles, and direct resolve/reject calls are ignored from
    /// now on.
    ///
    /// Returns `Ok(false)` if the promise was already locked, and fails with
    /// [`ErrorKind::ChainingCycle`](crate::error::ErrorKind::ChainingCycle)
    /// if `other` is this very promise.
    pub fn resolve_with(&self, other: &Promise<T, E>) -> Result<bool> {
        if other.id() == self.shared.id() && other.handle().same_loop(self.shared.handle()) {
            return Err(Error::chaining_cycle(self.shared.id()));
        }
        if !self.shared.lock_for_adoption() {
            trace!(promise = %self.shared.id(), "adoption ignored; already locked");
            return Ok(false);
        }
        trace!(promise = %self.shared.id(), adopted = %other.id(), "adopting");
        let shared = Rc::clone(&self.shared);
        other.on_settle(move |outcome| {
            shared.settle_adopted(outcome);
        });
        Ok(true)
    }

    /// Applies a reaction's result.
    pub(crate) fn apply(&self, step: Step<T, E>) {
        match step {
            Step::Value(value) => {
                self.resolve(value);
            }
            Step::Throw(reason) => {
                self.reject(reason);
            }
            Step::Adopt(other) => {
                if let Err(err) = self.resolve_with(&other) {
                    error!(promise = %self.shared.id(), error = %err, "reaction returned its own promise");
                }
            }
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("promise", &self.shared.id())
            .field("locked", &self.shared.is_locked())
            .finish()
    }
}
