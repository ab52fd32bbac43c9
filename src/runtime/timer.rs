//! Timer wheel for the event loop.
//!
//! Timers are keyed on ticks (milliseconds of loop time), not wall-clock
//! instants, which keeps expiration deterministic:
//!
//! - Same tick → same timers expire
//! - Expiration order is deadline first, then timer ID (creation order)
//! - The wheel never reads the wall clock; the loop decides how time moves
//!
//! Cancellation is lazy: the callback is released right away, and its heap
//! key is skipped when it reaches the top.
//!
//! # Example
//!
//! ```ignore
//! let mut wheel = TimerWheel::starting_at(0);
//! wheel.insert(100, Box::new(|| println!("late")));
//! wheel.insert(50, Box::new(|| println!("early")));
//!
//! let expired = wheel.expire_until(75);
//! assert_eq!(expired.len(), 1); // the tick-50 timer
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use crate::runtime::queue::Task;
use crate::types::TimerId;

/// Heap key of a scheduled timer. Its callback lives in the wheel's map.
struct TimerEntry {
    deadline: u64,
    id: TimerId,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap ordering: earliest deadline first, then lowest id
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A handle to a scheduled timer, used to clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: TimerId,
    deadline: u64,
}

impl TimerHandle {
    /// Returns the timer ID.
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    /// Returns the tick the timer fires at.
    #[must_use]
    pub const fn deadline(&self) -> u64 {
        self.deadline
    }
}

/// A timer removed from the wheel because its deadline passed.
pub(crate) struct ExpiredTimer {
    pub(crate) id: TimerId,
    pub(crate) deadline: u64,
    pub(crate) callback: Task,
}

/// Deadline-ordered timer storage.
pub(crate) struct TimerWheel {
    heap: BinaryHeap<TimerEntry>,
    /// Callbacks of live timers. A heap key without an entry here was cancelled.
    callbacks: HashMap<TimerId, Task>,
    current_tick: u64,
    next_id: u64,
}

impl TimerWheel {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::starting_at(0)
    }

    pub(crate) fn starting_at(tick: u64) -> Self {
        Self {
            heap: BinaryHeap::new(),
            callbacks: HashMap::new(),
            current_tick: tick,
            next_id: 0,
        }
    }

    pub(crate) const fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Schedules `callback` to fire at `deadline`.
    ///
    /// A deadline in the past fires on the next expiry pass.
    pub(crate) fn insert(&mut self, deadline: u64, callback: Task) -> TimerHandle {
        let id = TimerId::from_raw(self.next_id);
        self.next_id += 1;
        self.heap.push(TimerEntry { deadline, id });
        self.callbacks.insert(id, callback);
        TimerHandle { id, deadline }
    }

    /// Removes a timer, returning its callback if it was still scheduled.
    ///
    /// The callback is handed back so the caller can drop it after releasing
    /// any borrow on the wheel.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> Option<Task> {
        let callback = self.callbacks.remove(&handle.id)?;
        if self.callbacks.is_empty() {
            self.heap.clear();
        }
        Some(callback)
    }

    /// Returns the earliest pending deadline, if any, discarding cancelled
    /// keys that sit ahead of it.
    pub(crate) fn next_deadline(&mut self) -> Option<u64> {
        self.purge_cancelled();
        self.heap.peek().map(|t| t.deadline)
    }

    fn purge_cancelled(&mut self) {
        while self
            .heap
            .peek()
            .is_some_and(|t| !self.callbacks.contains_key(&t.id))
        {
            self.heap.pop();
        }
    }

    /// Moves time forward to `target_tick` (never backwards) and removes every
    /// timer whose deadline is at or before the resulting tick.
    ///
    /// Returns expired timers sorted by deadline, then by ID.
    pub(crate) fn expire_until(&mut self, target_tick: u64) -> Vec<ExpiredTimer> {
        self.current_tick = self.current_tick.max(target_tick);

        let mut expired = Vec::new();
        while self
            .heap
            .peek()
            .is_some_and(|t| t.deadline <= self.current_tick)
        {
            let Some(timer) = self.heap.pop() else {
                break;
            };
            if let Some(callback) = self.callbacks.remove(&timer.id) {
                expired.push(ExpiredTimer {
                    id: timer.id,
                    deadline: timer.deadline,
                    callback,
                });
            }
        }
        expired
    }

    /// Removes every timer. The caller drops the callbacks outside any borrow.
    pub(crate) fn take_all(&mut self) -> Vec<Task> {
        self.heap.clear();
        self.callbacks.drain().map(|(_, callback)| callback).collect()
    }
}

impl fmt::Debug for TimerWheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerWheel")
            .field("pending", &self.callbacks.len())
            .field(
                "stale_keys",
                &self.heap.len().saturating_sub(self.callbacks.len()),
            )
            .field("current_tick", &self.current_tick)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Task {
        Box::new(|| {})
    }

    #[test]
    fn new_wheel_starts_at_zero() {
        let wheel = TimerWheel::new();
        assert_eq!(wheel.current_tick(), 0);
        assert!(wheel.is_empty());
    }

    #[test]
    fn starting_at_custom_tick() {
        let wheel = TimerWheel::starting_at(1000);
        assert_eq!(wheel.current_tick(), 1000);
    }

    #[test]
    fn insert_and_expire() {
        let mut wheel = TimerWheel::new();
        wheel.insert(100, noop());
        wheel.insert(50, noop());
        wheel.insert(200, noop());

        let expired = wheel.expire_until(75);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].deadline, 50);
        assert_eq!(wheel.current_tick(), 75);

        let expired = wheel.expire_until(150);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].deadline, 100);

        let expired = wheel.expire_until(250);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].deadline, 200);
        assert!(wheel.is_empty());
    }

    #[test]
    fn same_deadline_fires_in_creation_order() {
        let mut wheel = TimerWheel::new();
        let h1 = wheel.insert(100, noop());
        let h2 = wheel.insert(100, noop());
        let h3 = wheel.insert(100, noop());

        let expired = wheel.expire_until(100);
        let ids: Vec<_> = expired.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![h1.id(), h2.id(), h3.id()]);
    }

    #[test]
    fn mixed_deadlines_ordering() {
        let mut wheel = TimerWheel::new();
        wheel.insert(200, noop()); // id=0
        wheel.insert(100, noop()); // id=1
        wheel.insert(100, noop()); // id=2
        wheel.insert(200, noop()); // id=3

        let expired = wheel.expire_until(300);
        let order: Vec<_> = expired
            .iter()
            .map(|t| (t.deadline, t.id.as_u64()))
            .collect();
        assert_eq!(order, vec![(100, 1), (100, 2), (200, 0), (200, 3)]);
    }

    #[test]
    fn zero_delay_timer_expires_without_moving_time() {
        let mut wheel = TimerWheel::starting_at(10);
        wheel.insert(10, noop());
        let expired = wheel.expire_until(10);
        assert_eq!(expired.len(), 1);
        assert_eq!(wheel.current_tick(), 10);
    }

    #[test]
    fn time_never_moves_backwards() {
        let mut wheel = TimerWheel::starting_at(100);
        let expired = wheel.expire_until(50);
        assert!(expired.is_empty());
        assert_eq!(wheel.current_tick(), 100);
    }

    #[test]
    fn cancel_removes_timer() {
        let mut wheel = TimerWheel::new();
        let h1 = wheel.insert(50, noop());
        let h2 = wheel.insert(100, noop());

        assert!(wheel.cancel(h1).is_some());
        assert!(wheel.cancel(h1).is_none());
        assert_eq!(wheel.next_deadline(), Some(100));

        let expired = wheel.expire_until(100);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, h2.id());
    }

    #[test]
    fn cancel_releases_callback_and_skips_stale_key() {
        use std::rc::Rc;

        let mut wheel = TimerWheel::new();
        let guard = Rc::new(());
        let held = Rc::clone(&guard);
        let early = wheel.insert(10, Box::new(move || drop(held)));
        let kept = wheel.insert(20, noop());
        let late = wheel.insert(30, noop());

        drop(wheel.cancel(early));
        assert_eq!(Rc::strong_count(&guard), 1);
        assert_eq!(wheel.len(), 2);
        assert!(wheel.cancel(late).is_some());
        assert_eq!(wheel.next_deadline(), Some(20));

        let expired = wheel.expire_until(100);
        let ids: Vec<_> = expired.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![kept.id()]);
        assert!(wheel.is_empty());
        assert_eq!(wheel.next_deadline(), None);
    }

    #[test]
    fn cancelling_many_timers_keeps_order_of_survivors() {
        let mut wheel = TimerWheel::new();
        let handles: Vec<_> = (0..100).map(|i| wheel.insert(i % 10, noop())).collect();
        for handle in handles.iter().filter(|h| h.id().as_u64() % 2 == 0) {
            assert!(wheel.cancel(*handle).is_some());
        }
        assert_eq!(wheel.len(), 50);

        let expired = wheel.expire_until(10);
        let order: Vec<_> = expired
            .iter()
            .map(|t| (t.deadline, t.id.as_u64()))
            .collect();
        let mut expected: Vec<_> = handles
            .iter()
            .filter(|h| h.id().as_u64() % 2 == 1)
            .map(|h| (h.deadline(), h.id().as_u64()))
            .collect();
        expected.sort_unstable();
        assert_eq!(order, expected);
    }

    #[test]
    fn take_all_clears() {
        let mut wheel = TimerWheel::new();
        wheel.insert(1, noop());
        wheel.insert(2, noop());
        assert_eq!(wheel.take_all().len(), 2);
        assert!(wheel.is_empty());
        assert_eq!(wheel.len(), 0);
    }
}
