//! Payloads from panics caught by the event loop.

use core::fmt;
use std::any::Any;

use serde::{Deserialize, Serialize};

/// Payload from a caught panic.
///
/// The loop catches panics raised by tasks and reactions so that one faulty
/// callback does not stop the remaining work. The payload keeps the message
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicPayload {
    message: String,
}

impl PanicPayload {
    /// Creates a new panic payload with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts a payload from the value returned by `catch_unwind`.
    #[must_use]
    pub fn from_unwind(payload: &(dyn Any + Send)) -> Self {
        if let Some(s) = payload.downcast_ref::<&'static str>() {
            Self::new(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(s.clone())
        } else {
            Self::new("non-string panic payload")
        }
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payload_display() {
        let payload = PanicPayload::new("something went wrong");
        assert_eq!(format!("{payload}"), "panic: something went wrong");
    }

    #[test]
    fn from_unwind_reads_str_and_string() {
        let caught = std::panic::catch_unwind(|| panic!("static message"))
            .expect_err("closure panics");
        assert_eq!(PanicPayload::from_unwind(&*caught).message(), "static message");

        let caught = std::panic::catch_unwind(|| panic!("formatted {}", 42))
            .expect_err("closure panics");
        assert_eq!(PanicPayload::from_unwind(&*caught).message(), "formatted 42");
    }

    #[test]
    fn from_unwind_other_payload() {
        let caught = std::panic::catch_unwind(|| std::panic::panic_any(7_u8))
            .expect_err("closure panics");
        assert_eq!(
            PanicPayload::from_unwind(&*caught).message(),
            "non-string panic payload"
        );
    }
}
