//! settle: a deterministic, single-threaded promise runtime for Rust.
//!
//! # Overview
//!
//! settle models single-resolution asynchronous values ("promises") the way
//! event-loop languages define them, with every ordering rule made explicit:
//! a promise settles once, reactions run as microtasks in registration order,
//! and microtasks always drain before the next macrotask or timer.
//!
//! # Core Guarantees
//!
//! - **Settle once**: the first resolve/reject wins; later attempts are no-ops
//! - **Never inline**: reactions never run inside the call that registers them
//! - **Deterministic**: virtual time by default; same program, same order
//! - **No ambient runtime**: every promise is created against an explicit [`Handle`]
//! - **Loud failures**: unhandled rejections and panicking callbacks are reported
//!
//! # Module Structure
//!
//! - [`promise`]: settle-once promises, resolvers, reactions
//! - [`combinator`]: `all`, `all_settled`, `race`, `any`, `timeout`
//! - [`sequence`]: lazy sequences driven by explicit coroutines
//! - [`runtime`]: event loop, task lanes, virtual timers
//! - [`types`]: identifiers, settlements, panic payloads
//! - [`config`]: loop configuration and environment overrides
//! - [`error`]: error types
//! - [`tracing_compat`]: logging that compiles away without `tracing`
//!
//! # Example
//!
//! ```
//! use settle::{combinator, EventLoop, Promise};
//!
//! let lp = EventLoop::new();
//! let h = lp.handle();
//!
//! let combined = combinator::all(
//!     &h,
//!     [
//!         Promise::<u32, String>::delay(&h, 300, 1),
//!         Promise::delay(&h, 100, 2),
//!     ],
//! );
//!
//! let outcome = lp.block_on(&combined).unwrap();
//! assert_eq!(outcome.value(), Some(&vec![1, 2]));
//! assert_eq!(lp.now(), 300);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod combinator;
pub mod config;
pub mod error;
pub mod promise;
pub mod runtime;
pub mod sequence;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod tracing_compat;
pub mod types;

pub use combinator::AggregateError;
pub use config::{ClockMode, ConfigError, LoopConfig, UnhandledRejectionResponse};
pub use error::{Error, ErrorCategory, ErrorKind, Result, ResultExt};
pub use promise::{Promise, Resolver, Step};
pub use runtime::{EventLoop, Handle, LoopReport, LoopStats, TimerHandle, UnhandledRejection};
pub use sequence::{Coroutine, LazySequence, NextResult, Resume};
pub use types::{PanicPayload, PromiseId, PromiseState, Settlement, TimerId};
