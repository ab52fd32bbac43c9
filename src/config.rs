//! Event loop configuration.
//!
//! [`LoopConfig`] controls how an [`EventLoop`](crate::runtime::EventLoop)
//! advances time, how long it may run, and what it does with unhandled
//! rejections.
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `clock` | [`ClockMode::Virtual`] |
//! | `start_tick` | 0 |
//! | `max_steps` | `Some(1_000_000)` |
//! | `unhandled_rejection` | [`UnhandledRejectionResponse::Log`] |
//!
//! # Environment Overrides
//!
//! [`apply_env_overrides`] applies only the variables that are set:
//!
//! | Variable | Values | Maps to |
//! |----------|--------|---------|
//! | `SETTLE_CLOCK` | `virtual`, `wall` | `clock` |
//! | `SETTLE_MAX_STEPS` | `u64`, `none` | `max_steps` |
//! | `SETTLE_UNHANDLED_REJECTIONS` | `log`, `panic`, `silent` | `unhandled_rejection` |

use serde::{Deserialize, Serialize};

/// Environment variable name for the clock mode.
pub const ENV_CLOCK: &str = "SETTLE_CLOCK";
/// Environment variable name for the step limit.
pub const ENV_MAX_STEPS: &str = "SETTLE_MAX_STEPS";
/// Environment variable name for the unhandled rejection response.
pub const ENV_UNHANDLED_REJECTIONS: &str = "SETTLE_UNHANDLED_REJECTIONS";

/// How the loop moves time forward when only timers remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Jump straight to the next timer deadline. Deterministic and instant.
    Virtual,
    /// Sleep the thread until the next timer deadline.
    Wall,
}

/// Response policy when a rejection is never handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnhandledRejectionResponse {
    /// Panic immediately with diagnostic details.
    Panic,
    /// Log the rejection and keep it for the loop report.
    Log,
    /// Keep it for the loop report without logging.
    Silent,
}

/// Configuration for an event loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Time source for timers.
    pub clock: ClockMode,
    /// Virtual tick (milliseconds) the loop starts at.
    pub start_tick: u64,
    /// Maximum number of tasks the loop may execute across its lifetime.
    pub max_steps: Option<u64>,
    /// What to do with rejections nobody handled.
    pub unhandled_rejection: UnhandledRejectionResponse,
}

impl LoopConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: ClockMode::Virtual,
            start_tick: 0,
            max_steps: Some(1_000_000),
            unhandled_rejection: UnhandledRejectionResponse::Log,
        }
    }

    /// Creates the default configuration with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Sets the clock mode.
    #[must_use]
    pub const fn clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the starting virtual tick.
    #[must_use]
    pub const fn start_tick(mut self, tick: u64) -> Self {
        self.start_tick = tick;
        self
    }

    /// Sets the maximum number of steps.
    #[must_use]
    pub const fn max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Disables the step limit.
    #[must_use]
    pub const fn no_step_limit(mut self) -> Self {
        self.max_steps = None;
        self
    }

    /// Sets the unhandled rejection response.
    #[must_use]
    pub const fn unhandled_rejection(mut self, response: UnhandledRejectionResponse) -> Self {
        self.unhandled_rejection = response;
        self
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is set to a value that does not parse.
    #[error("invalid value for {var}: expected {expected}, got {got:?}")]
    InvalidValue {
        /// The variable name.
        var: &'static str,
        /// Description of the accepted values.
        expected: &'static str,
        /// The value found.
        got: String,
    },
}

/// Apply environment variable overrides to a [`LoopConfig`].
///
/// Only variables that are set in the environment are applied.
/// Returns an error if a variable is set but contains an unparseable value.
pub fn apply_env_overrides(config: &mut LoopConfig) -> Result<(), ConfigError> {
    if let Some(val) = read_env(ENV_CLOCK) {
        config.clock = parse_clock(&val)?;
    }
    if let Some(val) = read_env(ENV_MAX_STEPS) {
        config.max_steps = parse_max_steps(&val)?;
    }
    if let Some(val) = read_env(ENV_UNHANDLED_REJECTIONS) {
        config.unhandled_rejection = parse_unhandled(&val)?;
    }
    Ok(())
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_clock(val: &str) -> Result<ClockMode, ConfigError> {
    match val.trim().to_ascii_lowercase().as_str() {
        "virtual" => Ok(ClockMode::Virtual),
        "wall" => Ok(ClockMode::Wall),
        _ => Err(ConfigError::InvalidValue {
            var: ENV_CLOCK,
            expected: "virtual or wall",
            got: val.to_string(),
        }),
    }
}

fn parse_max_steps(val: &str) -> Result<Option<u64>, ConfigError> {
    let trimmed = val.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            var: ENV_MAX_STEPS,
            expected: "unsigned integer or none",
            got: val.to_string(),
        })
}

fn parse_unhandled(val: &str) -> Result<UnhandledRejectionResponse, ConfigError> {
    match val.trim().to_ascii_lowercase().as_str() {
        "log" => Ok(UnhandledRejectionResponse::Log),
        "panic" => Ok(UnhandledRejectionResponse::Panic),
        "silent" => Ok(UnhandledRejectionResponse::Silent),
        _ => Err(ConfigError::InvalidValue {
            var: ENV_UNHANDLED_REJECTIONS,
            expected: "log, panic, or silent",
            got: val.to_string(),
        }),
    }
}
