//! Settle-once promises.
//!
//! A [`Promise`] is created pending by its producer and settled exactly once,
//! either fulfilled with a value or rejected with a reason. Consumers attach
//! reactions with [`Promise::subscribe`] and its shorthands; each reaction
//! produces a new derived promise, so chains read top to bottom:
//!
//! ```
//! use settle::{EventLoop, Promise, Step};
//!
//! let lp = EventLoop::new();
//! let h = lp.handle();
//!
//! let doubled = Promise::<i32, String>::delay(&h, 100, 21)
//!     .map(|n| n * 2)
//!     .catch(|_| Step::Value(0));
//!
//! let outcome = lp.block_on(&doubled).unwrap();
//! assert_eq!(outcome.value(), Some(&42));
//! assert_eq!(lp.now(), 100);
//! ```
//!
//! # Ordering
//!
//! Reactions never run inside the call that registers them. On settlement,
//! every reaction registered so far is queued as a microtask in registration
//! order; a reaction registered after settlement is queued right away with the
//! fixed outcome.
//!
//! # Unhandled rejections
//!
//! A promise that rejects and is dropped without any reaction attached is
//! reported to its loop as an
//! [`UnhandledRejection`](crate::runtime::UnhandledRejection).

mod resolver;
mod shared;
mod step;

pub use resolver::Resolver;
pub use step::Step;

use std::fmt;
use std::rc::Rc;

use self::shared::PromiseShared;
use crate::error::{Error, Result};
use crate::runtime::Handle;
use crate::tracing_compat::trace;
use crate::types::{PromiseId, PromiseState, Settlement};

/// A single-resolution value produced asynchronously on an
/// [`EventLoop`](crate::EventLoop).
///
/// Cloning is cheap and every clone observes the same settlement.
pub struct Promise<T, E> {
    shared: Rc<PromiseShared<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T, E> Promise<T, E> {
    /// Returns this promise's ID.
    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.shared.id()
    }

    /// Returns the current state. A promise locked onto another one reports
    /// `Pending` until that one settles.
    #[must_use]
    pub fn state(&self) -> PromiseState {
        self.shared.state()
    }

    /// Returns true once fulfilled or rejected.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state().is_settled()
    }

    /// Returns true while not yet settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.is_settled()
    }

    /// Returns the handle of the loop this promise belongs to.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        self.shared.handle()
    }

    /// Number of reactions waiting for settlement.
    #[must_use]
    pub fn waiting_reactions(&self) -> usize {
        self.shared.reaction_count()
    }

    pub(crate) fn mark_handled(&self) {
        self.shared.mark_handled();
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Creates a promise and runs `executor` synchronously with its resolver.
    ///
    /// Only the first settling call has an effect; the rest are ignored. An
    /// `Err` returned by the executor rejects the promise unless it was
    /// already settled.
    pub fn new<F>(handle: &Handle, executor: F) -> Self
    where
        F: FnOnce(Resolver<T, E>) -> core::result::Result<(), E>,
    {
        let (promise, resolver) = Self::pending(handle);
        if let Err(reason) = executor(resolver.clone()) {
            if !resolver.reject(reason) {
                trace!(promise = %promise.id(), "executor error ignored; already settled");
            }
        }
        promise
    }

    /// Creates a pending promise together with the resolver that settles it.
    #[must_use]
    pub fn pending(handle: &Handle) -> (Self, Resolver<T, E>) {
        let shared = Rc::new(PromiseShared::new(handle));
        trace!(promise = %shared.id(), "promise created");
        let resolver = Resolver::from_shared(Rc::clone(&shared));
        (Self { shared }, resolver)
    }

    /// Creates an already fulfilled promise.
    #[must_use]
    pub fn resolved(handle: &Handle, value: T) -> Self {
        let (promise, resolver) = Self::pending(handle);
        resolver.resolve(value);
        promise
    }

    /// Creates an already rejected promise.
    #[must_use]
    pub fn rejected(handle: &Handle, reason: E) -> Self {
        let (promise, resolver) = Self::pending(handle);
        resolver.reject(reason);
        promise
    }

    /// Creates a promise fulfilled with `value` after `ms` of loop time.
    #[must_use]
    pub fn delay(handle: &Handle, ms: u64, value: T) -> Self {
        let (promise, resolver) = Self::pending(handle);
        handle.set_timeout(ms, move || {
            resolver.resolve(value);
        });
        promise
    }

    /// Creates a promise rejected with `reason` after `ms` of loop time.
    #[must_use]
    pub fn rejected_after(handle: &Handle, ms: u64, reason: E) -> Self {
        let (promise, resolver) = Self::pending(handle);
        handle.set_timeout(ms, move || {
            resolver.reject(reason);
        });
        promise
    }

    /// Returns the settlement, or a `NotSettled` error while pending.
    pub fn try_settlement(&self) -> Result<Settlement<T, E>> {
        self.shared
            .settlement()
            .ok_or_else(|| Error::not_settled(self.id()))
    }

    /// Attaches a raw reaction that observes the settlement and derives
    /// nothing. Counts as handling a rejection.
    pub fn on_settle<F>(&self, f: F)
    where
        F: FnOnce(Settlement<T, E>) + 'static,
    {
        self.shared.react(Box::new(f));
    }

    fn derive<U, E2, F>(&self, f: F) -> Promise<U, E2>
    where
        U: Clone + 'static,
        E2: Clone + fmt::Debug + 'static,
        F: FnOnce(Settlement<T, E>) -> Step<U, E2> + 'static,
    {
        let (derived, resolver) = Promise::pending(self.handle());
        trace!(promise = %self.id(), derived = %derived.id(), "reaction attached");
        self.on_settle(move |outcome| resolver.apply(f(outcome)));
        derived
    }

    /// Attaches one callback per outcome and returns the promise settled by
    /// whichever runs.
    ///
    /// To reject the derived promise, return [`Step::Throw`]. A callback that
    /// panics does not reject it: the loop catches the panic and records it
    /// in [`LoopReport::panics`](crate::runtime::LoopReport::panics), and the
    /// derived promise stays pending forever.
    pub fn subscribe<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Step<U, E> + 'static,
        G: FnOnce(E) -> Step<U, E> + 'static,
    {
        self.derive(move |outcome| match outcome {
            Settlement::Fulfilled { value } => on_fulfilled(value),
            Settlement::Rejected { reason } => on_rejected(reason),
        })
    }

    /// Reacts to fulfillment; a rejection passes through unchanged.
    ///
    /// As with [`subscribe`](Self::subscribe), a panicking callback leaves the
    /// returned promise pending; use [`Step::Throw`] to reject it.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Step<U, E> + 'static,
    {
        self.subscribe(on_fulfilled, Step::Throw)
    }

    /// Transforms the fulfilled value.
    pub fn map<U, F>(&self, f: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.then(move |value| Step::Value(f(value)))
    }

    /// Transforms the rejection reason.
    pub fn map_err<E2, F>(&self, f: F) -> Promise<T, E2>
    where
        E2: Clone + fmt::Debug + 'static,
        F: FnOnce(E) -> E2 + 'static,
    {
        self.derive(move |outcome| match outcome {
            Settlement::Fulfilled { value } => Step::Value(value),
            Settlement::Rejected { reason } => Step::Throw(f(reason)),
        })
    }

    /// Reacts to rejection; a fulfillment passes through unchanged.
    pub fn catch<F>(&self, on_rejected: F) -> Self
    where
        F: FnOnce(E) -> Step<T, E> + 'static,
    {
        self.subscribe(Step::Value, on_rejected)
    }

    /// Runs `on_settled` on either outcome, then forwards the outcome
    /// unchanged.
    pub fn finally<F>(&self, on_settled: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.derive(move |outcome| {
            on_settled();
            Step::from(outcome)
        })
    }

    /// Like [`Self::finally`], but the callback may fail or wait.
    ///
    /// `Step::Throw` replaces the forwarded outcome with a rejection.
    /// `Step::Adopt` waits for that promise; if it rejects, its reason
    /// replaces the forwarded outcome.
    pub fn finally_with<F>(&self, on_settled: F) -> Self
    where
        F: FnOnce() -> Step<(), E> + 'static,
    {
        self.derive(move |outcome| match on_settled() {
            Step::Value(()) => Step::from(outcome),
            Step::Throw(reason) => Step::Throw(reason),
            Step::Adopt(gate) => Step::Adopt(gate.then(move |()| Step::from(outcome))),
        })
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}
