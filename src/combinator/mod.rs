//! Combinators over groups of promises.
//!
//! Each combinator subscribes to every input and settles one new promise
//! according to its merge policy:
//!
//! | Combinator | Fulfills when | Rejects when |
//! |------------|---------------|--------------|
//! | [`all`] | every input fulfilled (values in input order) | first input rejects |
//! | [`all_settled`] | every input settled | never |
//! | [`race`] | first input to settle fulfilled | first input to settle rejected |
//! | [`any`] | first input fulfills | every input rejected |
//! | [`timeout`] | target fulfills in time | target rejects, or time runs out |
//!
//! None of them cancel the other members. Settlements that arrive after the
//! combined promise has settled are observed and discarded, so they never show
//! up as unhandled rejections.

mod all;
mod all_settled;
mod any;
mod race;
mod timeout;

pub use all::all;
pub use all_settled::all_settled;
pub use any::{any, AggregateError};
pub use race::race;
pub use timeout::timeout;

/// Positional result slots filled as members settle, in any order.
#[derive(Debug)]
pub(crate) struct Slots<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Slots<T> {
    pub(crate) fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self {
            slots,
            remaining: len,
        }
    }

    /// Fills slot `index`. Returns every value in input order once the last
    /// slot is filled.
    pub(crate) fn fill(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        let slot = self.slots.get_mut(index)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(value);
        self.remaining -= 1;
        if self.remaining > 0 {
            return None;
        }
        std::mem::take(&mut self.slots).into_iter().collect()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_complete_in_input_order() {
        let mut slots = Slots::new(3);
        assert_eq!(slots.fill(2, "c"), None);
        assert_eq!(slots.fill(0, "a"), None);
        assert_eq!(slots.remaining(), 1);
        assert_eq!(slots.fill(1, "b"), Some(vec!["a", "b", "c"]));
    }

    #[test]
    fn slots_ignore_refill_and_out_of_range() {
        let mut slots = Slots::new(2);
        assert_eq!(slots.fill(0, 1), None);
        assert_eq!(slots.fill(0, 9), None);
        assert_eq!(slots.fill(5, 9), None);
        assert_eq!(slots.remaining(), 1);
        assert_eq!(slots.fill(1, 2), Some(vec![1, 2]));
    }
}
