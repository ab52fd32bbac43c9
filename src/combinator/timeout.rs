//! Timeout combinator: bound how long a promise may stay pending.
//!
//! `timeout(p, ms, reason)` races `p` against a timer that rejects with
//! `reason`. Whichever settles first decides. If `p` settles first the timer
//! is cleared, so a loop left with nothing else to do goes idle at once
//! instead of waiting out the deadline.

use std::fmt;

use crate::promise::Promise;
use crate::runtime::Handle;
use crate::tracing_compat::debug;

/// Settles like `promise` if it settles within `ms` of loop time; otherwise
/// rejects with `reason`.
pub fn timeout<T, E>(handle: &Handle, promise: &Promise<T, E>, ms: u64, reason: E) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    let (bounded, resolver) = Promise::pending(handle);

    let on_expiry = resolver.clone();
    let target = promise.id();
    let timer = handle.set_timeout(ms, move || {
        if on_expiry.reject(reason) {
            debug!(promise = %target, timeout_ms = ms, "promise timed out");
        }
    });

    let timers = handle.clone();
    promise.on_settle(move |outcome| {
        timers.clear_timeout(timer);
        resolver.settle(outcome);
    });
    bounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_logging, test_loop};
    use crate::{assert_fulfilled, assert_rejected};

    #[test]
    fn settles_in_time() {
        init_test_logging();
        let lp = test_loop();
        let h = lp.handle();

        let slow = Promise::<i32, String>::delay(&h, 10, 7);
        let bounded = timeout(&h, &slow, 100, "timed out".into());

        assert_fulfilled!(lp.block_on(&bounded).unwrap(), 7);
        assert_eq!(lp.pending_timers(), 0);
        lp.run().unwrap();
        assert_eq!(lp.now(), 10);
    }

    #[test]
    fn rejects_when_deadline_passes() {
        init_test_logging();
        let lp = test_loop();
        let h = lp.handle();

        let slow = Promise::<i32, String>::delay(&h, 500, 7);
        let bounded = timeout(&h, &slow, 100, "timed out".into());

        assert_rejected!(lp.block_on(&bounded).unwrap(), "timed out".to_string());
        assert_eq!(lp.now(), 100);

        let report = lp.run().unwrap();
        assert_eq!(report.final_tick, 500);
        assert!(slow.is_settled());
    }

    #[test]
    fn target_rejection_passes_through() {
        let lp = test_loop();
        let h = lp.handle();

        let failing = Promise::<i32, String>::rejected_after(&h, 5, "bad".into());
        let bounded = timeout(&h, &failing, 100, "timed out".into());
        assert_rejected!(lp.block_on(&bounded).unwrap(), "bad".to_string());
    }
}
