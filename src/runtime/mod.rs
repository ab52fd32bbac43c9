//! Scheduling: task lanes, the virtual timer wheel and the event loop.
//!
//! - [`queue`]: microtask and macrotask lanes
//! - [`timer`]: deadline-ordered timers on loop time
//! - [`event_loop`]: the loop, its [`Handle`], and the turn structure
//! - [`diagnostics`]: unhandled rejections and run reports
//!
//! # Quick Start
//!
//! ```
//! use settle::EventLoop;
//!
//! let lp = EventLoop::new();
//! let h = lp.handle();
//! h.set_timeout(250, || println!("later"));
//! h.queue_microtask(|| println!("first"));
//!
//! let report = lp.run().unwrap();
//! assert_eq!(report.final_tick, 250);
//! ```

pub mod diagnostics;
pub mod event_loop;
pub mod queue;
pub mod timer;

pub use diagnostics::{LoopReport, LoopStats, UnhandledRejection};
pub use event_loop::{EventLoop, Handle};
pub use queue::Lane;
pub use timer::TimerHandle;
