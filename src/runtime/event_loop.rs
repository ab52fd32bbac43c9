//! The cooperative event loop.
//!
//! # Turn Structure
//!
//! ```text
//! turn():
//!   checkpoint()               // drain microtasks to empty
//!   if no macrotask is ready:
//!     advance clock to next timer deadline, queue expired timers
//!   run one macrotask
//!   checkpoint()
//! ```
//!
//! Promise reactions are microtasks, so every reaction made runnable by a
//! macrotask (a timer resolving a promise, say) runs before the next
//! macrotask or timer gets a chance.
//!
//! # Ownership
//!
//! The [`EventLoop`] owns the queues and timers. A [`Handle`] is the
//! capability to schedule work on it; promises keep one so they can queue
//! their reactions. Dropping the loop discards pending work and closes every
//! outstanding handle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::{ClockMode, LoopConfig, UnhandledRejectionResponse};
use crate::error::{Error, Result};
use crate::promise::{Promise, Resolver};
use crate::runtime::diagnostics::{LoopReport, LoopStats, UnhandledRejection};
use crate::runtime::queue::{Lane, Task, TaskQueues};
use crate::runtime::timer::{TimerHandle, TimerWheel};
use crate::tracing_compat::{debug, error, trace, warn};
use crate::types::{PanicPayload, PromiseId, Settlement};

struct LoopState {
    config: LoopConfig,
    queues: RefCell<TaskQueues>,
    timers: RefCell<TimerWheel>,
    unhandled: RefCell<Vec<UnhandledRejection>>,
    panics: RefCell<Vec<PanicPayload>>,
    stats: Cell<LoopStats>,
    next_promise: Cell<u64>,
    closed: Cell<bool>,
    origin: Instant,
}

impl LoopState {
    fn bump(&self, f: impl FnOnce(&mut LoopStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

/// Capability to schedule work on an [`EventLoop`].
///
/// Cloning is cheap. All clones refer to the same loop.
#[derive(Clone)]
pub struct Handle {
    state: Rc<LoopState>,
}

impl Handle {
    /// Queues a microtask. It runs at the next checkpoint, after every
    /// microtask queued before it.
    pub fn queue_microtask<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.push(Lane::Microtask, Box::new(f));
    }

    /// Queues a macrotask. It runs in its own turn, after earlier macrotasks.
    pub fn queue_task<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.push(Lane::Macrotask, Box::new(f));
    }

    fn push(&self, lane: Lane, task: Task) {
        if self.state.closed.get() {
            warn!(lane = %lane, "event loop closed; dropping task");
            return;
        }
        self.state.queues.borrow_mut().push(lane, task);
    }

    /// Schedules `f` to run as a macrotask once `delay_ms` of loop time has
    /// passed.
    pub fn set_timeout<F>(&self, delay_ms: u64, f: F) -> TimerHandle
    where
        F: FnOnce() + 'static,
    {
        let mut timers = self.state.timers.borrow_mut();
        let deadline = timers.current_tick().saturating_add(delay_ms);
        let handle = timers.insert(deadline, Box::new(f));
        if self.state.closed.get() {
            let callback = timers.cancel(handle);
            drop(timers);
            drop(callback);
            warn!(timer = %handle.id(), "event loop closed; dropping timer");
            return handle;
        }
        trace!(timer = %handle.id(), deadline, "timer scheduled");
        handle
    }

    /// Clears a timer. Returns true if it had not fired yet.
    pub fn clear_timeout(&self, handle: TimerHandle) -> bool {
        let callback = self.state.timers.borrow_mut().cancel(handle);
        let cleared = callback.is_some();
        drop(callback);
        if cleared {
            trace!(timer = %handle.id(), "timer cleared");
        }
        cleared
    }

    /// Returns the current loop time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.state.timers.borrow().current_tick()
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.state.config
    }

    /// Returns true once the owning loop has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.closed.get()
    }

    /// Returns true if both handles refer to the same loop.
    #[must_use]
    pub fn same_loop(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Creates a promise on this loop. See [`Promise::new`].
    pub fn promise<T, E, F>(&self, executor: F) -> Promise<T, E>
    where
        T: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
        F: FnOnce(Resolver<T, E>) -> core::result::Result<(), E>,
    {
        Promise::new(self, executor)
    }

    pub(crate) fn allocate_promise_id(&self) -> PromiseId {
        let raw = self.state.next_promise.get();
        self.state.next_promise.set(raw + 1);
        self.state.bump(|s| s.promises_created += 1);
        PromiseId::from_raw(raw)
    }

    pub(crate) fn report_unhandled(&self, rejection: UnhandledRejection) {
        match self.state.config.unhandled_rejection {
            UnhandledRejectionResponse::Log | UnhandledRejectionResponse::Panic => {
                warn!(
                    promise = %rejection.promise,
                    reason = %rejection.reason,
                    tick = rejection.tick,
                    "unhandled promise rejection"
                );
            }
            UnhandledRejectionResponse::Silent => {}
        }
        self.state.unhandled.borrow_mut().push(rejection);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("now", &self.now())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A single-threaded, deterministic event loop.
pub struct EventLoop {
    handle: Handle,
}

impl EventLoop {
    /// Creates a loop with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    /// Creates a loop with the given configuration.
    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        let timers = TimerWheel::starting_at(config.start_tick);
        let state = LoopState {
            config,
            queues: RefCell::new(TaskQueues::new()),
            timers: RefCell::new(timers),
            unhandled: RefCell::new(Vec::new()),
            panics: RefCell::new(Vec::new()),
            stats: Cell::new(LoopStats::default()),
            next_promise: Cell::new(0),
            closed: Cell::new(false),
            origin: Instant::now(),
        };
        Self {
            handle: Handle {
                state: Rc::new(state),
            },
        }
    }

    /// Creates a loop from the default configuration plus environment
    /// overrides.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(LoopConfig::from_env()?))
    }

    /// Returns a handle for scheduling work on this loop.
    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    fn state(&self) -> &LoopState {
        &self.handle.state
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.state().config
    }

    /// Returns the current loop time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.handle.now()
    }

    /// Returns a snapshot of the loop counters.
    #[must_use]
    pub fn stats(&self) -> LoopStats {
        self.state().stats.get()
    }

    /// Returns the number of queued microtasks and macrotasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        let queues = self.state().queues.borrow();
        queues.len(Lane::Microtask) + queues.len(Lane::Macrotask)
    }

    /// Returns the number of scheduled timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.state().timers.borrow().len()
    }

    /// Returns true if no task or timer is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state().queues.borrow().is_empty() && self.state().timers.borrow().is_empty()
    }

    /// Drains the microtask queue to empty, including microtasks queued while
    /// draining. Returns how many ran.
    pub fn run_microtasks(&self) -> Result<usize> {
        let mut ran = 0;
        while let Some(task) = self.next_task(Lane::Microtask)? {
            self.execute(Lane::Microtask, task);
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "microtask checkpoint drained");
        }
        Ok(ran)
    }

    /// Runs one turn. Returns false if there was nothing to do.
    pub fn turn(&self) -> Result<bool> {
        self.escalate_unhandled();
        let progressed = self.run_microtasks()? > 0;

        if self.state().queues.borrow().len(Lane::Macrotask) == 0 {
            let Some(deadline) = self.state().timers.borrow_mut().next_deadline() else {
                return Ok(progressed);
            };
            self.wait_until(deadline);
            self.queue_expired(deadline);
        }

        match self.next_task(Lane::Macrotask)? {
            Some(task) => {
                self.execute(Lane::Macrotask, task);
                self.run_microtasks()?;
                Ok(true)
            }
            None => Ok(progressed),
        }
    }

    /// Runs until no task or timer remains.
    ///
    /// Unhandled rejections and caught panics recorded so far are drained
    /// into the returned report.
    pub fn run(&self) -> Result<LoopReport> {
        while self.turn()? {}
        let report = self.report();
        debug!(
            steps = report.stats.steps,
            final_tick = report.final_tick,
            unhandled = report.unhandled_rejections.len(),
            panics = report.panics.len(),
            "event loop idle"
        );
        Ok(report)
    }

    /// Runs until `promise` settles and returns its settlement.
    ///
    /// Fails with [`ErrorKind::NotSettled`](crate::error::ErrorKind::NotSettled)
    /// if the loop runs out of work first, for example when racing an empty
    /// set of promises.
    ///
    /// Waiting on a promise counts as handling it: a rejection returned here
    /// is not reported as unhandled when the promise is dropped.
    pub fn block_on<T, E>(&self, promise: &Promise<T, E>) -> Result<Settlement<T, E>>
    where
        T: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
    {
        promise.mark_handled();
        loop {
            if promise.is_settled() {
                return promise.try_settlement();
            }
            if !self.turn()? {
                return promise.try_settlement();
            }
        }
    }

    /// Moves loop time forward by `ms`, running every timer that expires on
    /// the way along with the work it makes ready. Never sleeps, whatever the
    /// clock mode. Returns the number of timers fired.
    pub fn advance_by(&self, ms: u64) -> Result<u64> {
        let target = self.now().saturating_add(ms);
        let mut fired = 0;
        self.run_microtasks()?;
        loop {
            while let Some(task) = self.next_task(Lane::Macrotask)? {
                self.execute(Lane::Macrotask, task);
                self.run_microtasks()?;
            }
            let step_to = match self.state().timers.borrow_mut().next_deadline() {
                Some(deadline) if deadline <= target => deadline,
                _ => target,
            };
            let queued = self.queue_expired(step_to);
            fired += queued;
            if queued == 0 && step_to == target {
                break;
            }
        }
        Ok(fired)
    }

    /// Removes and returns the unhandled rejections recorded so far.
    pub fn take_unhandled_rejections(&self) -> Vec<UnhandledRejection> {
        std::mem::take(&mut *self.state().unhandled.borrow_mut())
    }

    /// Fails if any unhandled rejection has been recorded. The records stay
    /// on the loop.
    pub fn check_unhandled(&self) -> Result<()> {
        let unhandled = self.state().unhandled.borrow();
        if unhandled.is_empty() {
            Ok(())
        } else {
            Err(Error::from(unhandled.as_slice()))
        }
    }

    fn report(&self) -> LoopReport {
        LoopReport {
            stats: self.stats(),
            final_tick: self.now(),
            unhandled_rejections: self.take_unhandled_rejections(),
            panics: std::mem::take(&mut *self.state().panics.borrow_mut()),
        }
    }

    fn next_task(&self, lane: Lane) -> Result<Option<Task>> {
        if self.state().queues.borrow().len(lane) == 0 {
            return Ok(None);
        }
        if let Some(limit) = self.state().config.max_steps {
            if self.stats().steps >= limit {
                error!(limit, "event loop step limit exceeded");
                return Err(Error::step_limit_exceeded(limit));
            }
        }
        Ok(self.state().queues.borrow_mut().pop(lane))
    }

    fn execute(&self, lane: Lane, task: Task) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            let payload = PanicPayload::from_unwind(&*payload);
            error!(lane = %lane, panic = %payload, "task panicked; continuing");
            self.state().panics.borrow_mut().push(payload);
        }
        self.state().bump(|s| {
            s.steps += 1;
            match lane {
                Lane::Microtask => s.microtasks_run += 1,
                Lane::Macrotask => s.macrotasks_run += 1,
            }
        });
        self.escalate_unhandled();
    }

    /// Expires timers up to `tick` and queues their callbacks as macrotasks.
    fn queue_expired(&self, tick: u64) -> u64 {
        let expired = self.state().timers.borrow_mut().expire_until(tick);
        let count = expired.len() as u64;
        let mut queues = self.state().queues.borrow_mut();
        for timer in expired {
            debug!(timer = %timer.id, deadline = timer.deadline, "timer fired");
            queues.push(Lane::Macrotask, timer.callback);
        }
        drop(queues);
        self.state().bump(|s| s.timers_fired += count);
        count
    }

    fn wait_until(&self, deadline: u64) {
        if self.state().config.clock != ClockMode::Wall {
            return;
        }
        let elapsed = u64::try_from(self.state().origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        let wall_tick = self.state().config.start_tick.saturating_add(elapsed);
        if deadline > wall_tick {
            std::thread::sleep(Duration::from_millis(deadline - wall_tick));
        }
    }

    fn escalate_unhandled(&self) {
        if self.state().config.unhandled_rejection != UnhandledRejectionResponse::Panic {
            return;
        }
        let first = self.state().unhandled.borrow().first().cloned();
        if let Some(rejection) = first {
            panic!("{rejection}");
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("now", &self.now())
            .field("queues", &*self.state().queues.borrow())
            .field("timers", &*self.state().timers.borrow())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        let state = &self.handle.state;
        state.closed.set(true);
        let tasks = state.queues.borrow_mut().take_all();
        let timers = state.timers.borrow_mut().take_all();
        let discarded = tasks.len() + timers.len();
        drop(tasks);
        drop(timers);
        if discarded > 0 {
            debug!(discarded, "event loop dropped with pending work");
        }
    }
}
