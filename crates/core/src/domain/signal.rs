// Signal Domain Model

use std::time::Duration;

use super::error::{DomainError, Result};

/// Desired visual behavior of one output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSpec {
    /// Hold the channel at a fixed level
    Constant(bool),
    /// Toggle the channel every `period`
    Blink(Duration),
}

impl SignalSpec {
    /// Steady "off" signal, used for absent jobs and as the fallback
    pub const OFF: SignalSpec = SignalSpec::Constant(false);

    /// Check the parameters of this signal
    ///
    /// # Errors
    /// - `DomainError::InvalidParameter` if a blink period is zero
    pub fn validate(&self) -> Result<()> {
        match self {
            SignalSpec::Constant(_) => Ok(()),
            SignalSpec::Blink(period) if period.is_zero() => Err(DomainError::InvalidParameter(
                "blink period must be greater than zero".to_string(),
            )),
            SignalSpec::Blink(_) => Ok(()),
        }
    }
}

impl std::fmt::Display for SignalSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalSpec::Constant(true) => write!(f, "ON"),
            SignalSpec::Constant(false) => write!(f, "OFF"),
            SignalSpec::Blink(period) => write!(f, "BLINK({}ms)", period.as_millis()),
        }
    }
}
