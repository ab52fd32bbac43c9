//! `any`: first success wins; fails only when every member fails.
//!
//! ```text
//! any([p1, ..., pn]):
//!   first fulfillment        -> fulfill with it
//!   all n rejected           -> reject with AggregateError { errors in input order }
//!   n == 0                   -> reject with an empty AggregateError
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Slots;
use crate::promise::Promise;
use crate::runtime::Handle;
use crate::tracing_compat::trace;
use crate::types::Settlement;

/// Every member of an [`any`] group rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("all {} promises were rejected", .errors.len())]
pub struct AggregateError<E> {
    /// Rejection reasons in input order.
    pub errors: Vec<E>,
}

impl<E> AggregateError<E> {
    /// Creates an aggregate from reasons in input order.
    #[must_use]
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    /// Returns true if the group was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fulfills with the first input to fulfill. If every input rejects, rejects
/// with an [`AggregateError`] holding every reason in input order.
pub fn any<T, E, I>(handle: &Handle, promises: I) -> Promise<T, AggregateError<E>>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let (combined, resolver) = Promise::pending(handle);
    trace!(combined = %combined.id(), members = promises.len(), "any");
    if promises.is_empty() {
        resolver.reject(AggregateError::new(Vec::new()));
        return combined;
    }

    let failures = Rc::new(RefCell::new(Slots::new(promises.len())));
    for (index, member) in promises.iter().enumerate() {
        let failures = Rc::clone(&failures);
        let resolver = resolver.clone();
        member.on_settle(move |outcome| match outcome {
            Settlement::Fulfilled { value } => {
                resolver.resolve(value);
            }
            Settlement::Rejected { reason } => {
                let done = failures.borrow_mut().fill(index, reason);
                if let Some(errors) = done {
                    resolver.reject(AggregateError::new(errors));
                }
            }
        });
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_logging, test_loop};
    use crate::{assert_fulfilled, assert_rejected};

    #[test]
    fn first_fulfillment_wins_over_earlier_rejection() {
        init_test_logging();
        let lp = test_loop();
        let h = lp.handle();

        let combined = any(
            &h,
            [
                Promise::<i32, &str>::rejected_after(&h, 1, "down"),
                Promise::delay(&h, 20, 2),
                Promise::delay(&h, 10, 3),
            ],
        );
        assert_fulfilled!(lp.block_on(&combined).unwrap(), 3);
    }

    #[test]
    fn all_rejected_aggregates_in_input_order() {
        init_test_logging();
        let lp = test_loop();
        let h = lp.handle();

        let combined = any(
            &h,
            [
                Promise::<i32, &str>::rejected_after(&h, 30, "a"),
                Promise::rejected_after(&h, 10, "b"),
            ],
        );
        let outcome = lp.block_on(&combined).unwrap();
        assert_eq!(
            outcome.reason().map(ToString::to_string).as_deref(),
            Some("all 2 promises were rejected")
        );
        assert_rejected!(outcome, AggregateError::new(vec!["a", "b"]));
    }

    #[test]
    fn empty_input_rejects_immediately() {
        let lp = test_loop();
        let combined = any::<i32, String, _>(&lp.handle(), Vec::new());
        let reason = combined.try_settlement().unwrap().unwrap_rejected();
        assert!(reason.is_empty());
        let _ = combined.catch(|_| crate::promise::Step::Value(0));
    }
}
