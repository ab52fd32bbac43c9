//! Core types shared by promises, combinators, and the event loop.
//!
//! - [`id`]: Identifier types (`PromiseId`, `TimerId`)
//! - [`settlement`]: Promise states and settled outcomes
//! - [`panic`]: Payloads from panics caught by the loop

pub mod id;
pub mod panic;
pub mod settlement;

pub use id::{PromiseId, TimerId};
pub use panic::PanicPayload;
pub use settlement::{PromiseState, Settlement};
