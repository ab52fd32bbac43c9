//! Race combinator: first to settle wins.
//!
//! # Semantics
//!
//! ```text
//! race([p1, p2, ..., pn]):
//!   for p in inputs:
//!     p.on_settle(outcome => combined.settle(outcome))   // first call wins
//!   return combined
//! ```
//!
//! Losers are not cancelled. Their settlements arrive later and are dropped
//! by the settle-once guard.
//!
//! # Empty Input
//!
//! With nothing to race, the combined promise never settles.
//! [`EventLoop::block_on`](crate::EventLoop::block_on) reports that as
//! `NotSettled` once the loop runs dry.

use std::fmt;

use crate::promise::Promise;
use crate::runtime::Handle;
use crate::tracing_compat::{debug, trace};

/// Settles like the first input to settle, fulfilled or rejected.
pub fn race<T, E, I>(handle: &Handle, promises: I) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let (combined, resolver) = Promise::pending(handle);
    let mut members = 0usize;
    for member in promises {
        members += 1;
        let resolver = resolver.clone();
        let member_id = member.id();
        member.on_settle(move |outcome| {
            if resolver.settle(outcome) {
                trace!(combined = %resolver.promise_id(), winner = %member_id, "race won");
            }
        });
    }
    if members == 0 {
        debug!(combined = %combined.id(), "race over no promises; it will never settle");
    }
    combined
}
