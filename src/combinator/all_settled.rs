//! `all_settled`: wait for every member, keep every outcome.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Slots;
use crate::promise::Promise;
use crate::runtime::Handle;
use crate::tracing_compat::trace;
use crate::types::Settlement;

/// Waits for every input to settle and fulfills with one [`Settlement`] per
/// input, in input order. Never rejects.
///
/// An empty input fulfills immediately with an empty vector.
pub fn all_settled<T, E, I>(handle: &Handle, promises: I) -> Promise<Vec<Settlement<T, E>>, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let (combined, resolver) = Promise::pending(handle);
    trace!(combined = %combined.id(), members = promises.len(), "all_settled");
    if promises.is_empty() {
        resolver.resolve(Vec::new());
        return combined;
    }

    let slots = Rc::new(RefCell::new(Slots::new(promises.len())));
    for (index, member) in promises.iter().enumerate() {
        let slots = Rc::clone(&slots);
        let resolver = resolver.clone();
        member.on_settle(move |outcome| {
            let done = slots.borrow_mut().fill(index, outcome);
            if let Some(outcomes) = done {
                resolver.resolve(outcomes);
            }
        });
    }
    combined
}
