//! Loop diagnostics: unhandled rejections and run reports.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};
use crate::types::{PanicPayload, PromiseId};

/// A promise that rejected and was discarded without any reaction attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnhandledRejection {
    /// The discarded promise.
    pub promise: PromiseId,
    /// `Debug` rendering of the rejection reason.
    pub reason: String,
    /// Loop tick at which the promise was discarded.
    pub tick: u64,
}

impl fmt::Display for UnhandledRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unhandled rejection of {} at tick {}: {}",
            self.promise, self.tick, self.reason
        )
    }
}

impl From<&[UnhandledRejection]> for Error {
    fn from(rejections: &[UnhandledRejection]) -> Self {
        let mut err = Self::new(ErrorKind::UnhandledRejection);
        match rejections.first() {
            Some(first) => {
                err = err
                    .with_message(format!("{} unhandled; first: {first}", rejections.len()))
                    .with_promise(first.promise);
            }
            None => err = err.with_message("no unhandled rejections recorded"),
        }
        err
    }
}

/// Counters maintained by the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStats {
    /// Total tasks executed across both lanes.
    pub steps: u64,
    /// Microtasks executed.
    pub microtasks_run: u64,
    /// Macrotasks executed, timers included.
    pub macrotasks_run: u64,
    /// Timers that expired and were queued.
    pub timers_fired: u64,
    /// Promises created on this loop.
    pub promises_created: u64,
}

/// Summary returned by [`EventLoop::run`](super::EventLoop::run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopReport {
    /// Counters at the end of the run.
    pub stats: LoopStats,
    /// Loop tick at the end of the run.
    pub final_tick: u64,
    /// Rejections that were never handled, drained from the loop.
    pub unhandled_rejections: Vec<UnhandledRejection>,
    /// Panics caught while executing tasks, drained from the loop.
    pub panics: Vec<PanicPayload>,
}

impl LoopReport {
    /// Returns true if the run produced no unhandled rejections and no panics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unhandled_rejections.is_empty() && self.panics.is_empty()
    }
}
