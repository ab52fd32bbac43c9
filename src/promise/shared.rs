//! Shared promise state and the settle-once guard.
//!
//! The state word moves through:
//!
//! ```text
//! PENDING ──settle──────────────▶ FULFILLED | REJECTED
//!    │
//!    └──lock_for_adoption──▶ ADOPTING ──settle_adopted──▶ FULFILLED | REJECTED
//! ```
//!
//! Every transition is a compare-and-set from an expected state, so the first
//! caller wins and later attempts observe a mismatch and do nothing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use smallvec::SmallVec;

use crate::runtime::{Handle, UnhandledRejection};
use crate::tracing_compat::trace;
use crate::types::{PromiseId, PromiseState, Settlement};

const PENDING: u8 = 0;
const ADOPTING: u8 = 1;
const FULFILLED: u8 = 2;
const REJECTED: u8 = 3;

/// A reaction waiting for settlement. Runs as a microtask.
pub(crate) type Reaction<T, E> = Box<dyn FnOnce(Settlement<T, E>)>;

pub(crate) struct PromiseShared<T, E> {
    id: PromiseId,
    handle: Handle,
    state: AtomicU8,
    slot: RefCell<Option<Settlement<T, E>>>,
    reactions: RefCell<SmallVec<[Reaction<T, E>; 2]>>,
    handled: Cell<bool>,
    rejection_note: RefCell<Option<String>>,
}

impl<T, E> PromiseShared<T, E> {
    pub(crate) fn new(handle: &Handle) -> Self {
        Self {
            id: handle.allocate_promise_id(),
            handle: handle.clone(),
            state: AtomicU8::new(PENDING),
            slot: RefCell::new(None),
            reactions: RefCell::new(SmallVec::new()),
            handled: Cell::new(false),
            rejection_note: RefCell::new(None),
        }
    }

    pub(crate) const fn id(&self) -> PromiseId {
        self.id
    }

    pub(crate) const fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn state(&self) -> PromiseState {
        match self.state.load(Ordering::Acquire) {
            FULFILLED => PromiseState::Fulfilled,
            REJECTED => PromiseState::Rejected,
            _ => PromiseState::Pending,
        }
    }

    /// True once the promise was settled or locked onto another promise.
    pub(crate) fn is_locked(&self) -> bool {
        self.state.load(Ordering::Acquire) != PENDING
    }

    pub(crate) fn reaction_count(&self) -> usize {
        self.reactions.borrow().len()
    }

    /// Marks the promise as observed, so dropping it after a rejection is
    /// not reported.
    pub(crate) fn mark_handled(&self) {
        self.handled.set(true);
    }
}

impl<T, E> PromiseShared<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    pub(crate) fn settlement(&self) -> Option<Settlement<T, E>> {
        self.slot.borrow().clone()
    }

    /// Settles a pending promise. Returns false if it was already settled or
    /// locked onto another promise.
    pub(crate) fn settle(&self, outcome: Settlement<T, E>) -> bool {
        self.transition(PENDING, outcome)
    }

    /// Locks a pending promise so only its adopted promise can settle it.
    pub(crate) fn lock_for_adoption(&self) -> bool {
        self.state
            .compare_exchange(PENDING, ADOPTING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Settles a promise that was locked by [`Self::lock_for_adoption`].
    pub(crate) fn settle_adopted(&self, outcome: Settlement<T, E>) -> bool {
        self.transition(ADOPTING, outcome)
    }

    fn transition(&self, from: u8, outcome: Settlement<T, E>) -> bool {
        let to = match outcome {
            Settlement::Fulfilled { .. } => FULFILLED,
            Settlement::Rejected { .. } => REJECTED,
        };
        if self
            .state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!(promise = %self.id, "settlement ignored; already locked");
            return false;
        }

        if let Settlement::Rejected { reason } = &outcome {
            *self.rejection_note.borrow_mut() = Some(format!("{reason:?}"));
        }
        let reactions = std::mem::take(&mut *self.reactions.borrow_mut());
        trace!(
            promise = %self.id,
            state = %outcome.state(),
            reactions = reactions.len(),
            "settled"
        );
        for reaction in reactions {
            let outcome = outcome.clone();
            self.handle.queue_microtask(move || reaction(outcome));
        }
        *self.slot.borrow_mut() = Some(outcome);
        true
    }

    /// Registers a reaction. If already settled it is queued right away with
    /// the fixed outcome; it never runs inline.
    pub(crate) fn react(&self, reaction: Reaction<T, E>) {
        self.mark_handled();
        let settled = self.settlement();
        match settled {
            Some(outcome) => self.handle.queue_microtask(move || reaction(outcome)),
            None => self.reactions.borrow_mut().push(reaction),
        }
    }
}

impl<T, E> Drop for PromiseShared<T, E> {
    fn drop(&mut self) {
        if *self.state.get_mut() != REJECTED || self.handled.get() {
            return;
        }
        let reason = self.rejection_note.get_mut().take().unwrap_or_default();
        let tick = self.handle.now();
        self.handle.report_unhandled(UnhandledRejection {
            promise: self.id,
            reason,
            tick,
        });
    }
}
