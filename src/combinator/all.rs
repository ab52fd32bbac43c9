//! `all`: fulfill with every value, or reject with the first failure.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Slots;
use crate::promise::Promise;
use crate::runtime::Handle;
use crate::tracing_compat::trace;
use crate::types::Settlement;

/// Waits for every input to fulfill and fulfills with their values in input
/// order.
///
/// The first rejection, in settlement order, rejects the result with that
/// reason unchanged. Other members keep running; their outcomes are
/// discarded. An empty input fulfills immediately with an empty vector.
pub fn all<T, E, I>(handle: &Handle, promises: I) -> Promise<Vec<T>, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let (combined, resolver) = Promise::pending(handle);
    trace!(combined = %combined.id(), members = promises.len(), "all");
    if promises.is_empty() {
        resolver.resolve(Vec::new());
        return combined;
    }

    let slots = Rc::new(RefCell::new(Slots::new(promises.len())));
    for (index, member) in promises.iter().enumerate() {
        let slots = Rc::clone(&slots);
        let resolver = resolver.clone();
        member.on_settle(move |outcome| match outcome {
            Settlement::Fulfilled { value } => {
                let done = slots.borrow_mut().fill(index, value);
                if let Some(values) = done {
                    resolver.resolve(values);
                }
            }
            Settlement::Rejected { reason } => {
                resolver.reject(reason);
            }
        });
    }
    combined
}
