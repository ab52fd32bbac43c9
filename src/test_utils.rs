//! Test utilities for settle.
//!
//! Shared helpers for unit tests:
//! - Consistent tracing-based logging initialization
//! - Phase/section macros for readable test output
//! - Event loop constructors
//! - Settlement assertion macros

use crate::config::{LoopConfig, UnhandledRejectionResponse};
use crate::runtime::EventLoop;
use std::sync::{Mutex, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Step limit used by test loops; low enough to catch runaway chains quickly.
pub const TEST_MAX_STEPS: u64 = 100_000;

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Acquire the global environment lock for tests that mutate env vars.
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Config used by [`test_loop`]: virtual clock, bounded steps, logged
/// rejections.
#[must_use]
pub fn test_config() -> LoopConfig {
    LoopConfig::new()
        .max_steps(TEST_MAX_STEPS)
        .unhandled_rejection(UnhandledRejectionResponse::Log)
}

/// Create a deterministic event loop for testing.
#[must_use]
pub fn test_loop() -> EventLoop {
    EventLoop::with_config(test_config())
}

/// Create a test loop whose clock starts at `tick`.
#[must_use]
pub fn test_loop_at(tick: u64) -> EventLoop {
    EventLoop::with_config(test_config().start_tick(tick))
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Assert that a settlement is a fulfillment with a specific value.
#[macro_export]
macro_rules! assert_fulfilled {
    ($settlement:expr, $expected:expr) => {
        match $settlement {
            $crate::types::Settlement::Fulfilled { value } => assert_eq!(value, $expected),
            other => unreachable!("expected fulfillment with {:?}, got {:?}", $expected, other),
        }
    };
}

/// Assert that a settlement is a rejection, optionally with a specific reason.
#[macro_export]
macro_rules! assert_rejected {
    ($settlement:expr) => {
        match $settlement {
            $crate::types::Settlement::Rejected { .. } => {}
            other => unreachable!("expected rejection, got {:?}", other),
        }
    };
    ($settlement:expr, $expected:expr) => {
        match $settlement {
            $crate::types::Settlement::Rejected { reason } => assert_eq!(reason, $expected),
            other => unreachable!("expected rejection with {:?}, got {:?}", $expected, other),
        }
    };
}
