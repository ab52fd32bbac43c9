//! Two-lane task queue.
//!
//! The loop keeps two FIFO lanes:
//! 1. Microtask lane (highest priority) - promise reactions and
//!    `queue_microtask` callbacks. Drained to empty at every checkpoint.
//! 2. Macrotask lane - `queue_task` callbacks and expired timers. One
//!    macrotask runs per turn.
//!
//! Within each lane, tasks run strictly in enqueue order.

use std::collections::VecDeque;
use std::fmt;

/// A unit of work queued on the loop.
pub(crate) type Task = Box<dyn FnOnce()>;

/// The lane a task was queued on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Promise reactions and explicit microtasks.
    Microtask,
    /// Explicit tasks and expired timers.
    Macrotask,
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Microtask => f.write_str("microtask"),
            Self::Macrotask => f.write_str("macrotask"),
        }
    }
}

/// The two-lane queue.
#[derive(Default)]
pub(crate) struct TaskQueues {
    microtasks: VecDeque<Task>,
    macrotasks: VecDeque<Task>,
}

impl TaskQueues {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, lane: Lane, task: Task) {
        match lane {
            Lane::Microtask => self.microtasks.push_back(task),
            Lane::Macrotask => self.macrotasks.push_back(task),
        }
    }

    pub(crate) fn pop(&mut self, lane: Lane) -> Option<Task> {
        match lane {
            Lane::Microtask => self.microtasks.pop_front(),
            Lane::Macrotask => self.macrotasks.pop_front(),
        }
    }

    pub(crate) fn len(&self, lane: Lane) -> usize {
        match lane {
            Lane::Microtask => self.microtasks.len(),
            Lane::Macrotask => self.macrotasks.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.microtasks.is_empty() && self.macrotasks.is_empty()
    }

    /// Removes every queued task. The caller drops them outside any borrow.
    pub(crate) fn take_all(&mut self) -> Vec<Task> {
        self.microtasks
            .drain(..)
            .chain(self.macrotasks.drain(..))
            .collect()
    }
}

impl fmt::Debug for TaskQueues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueues")
            .field("microtasks", &self.microtasks.len())
            .field("macrotasks", &self.macrotasks.len())
            .finish()
    }
}
