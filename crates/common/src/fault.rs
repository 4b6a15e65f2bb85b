//! Simulated failures.
//!
//! Services can be told to fail a fraction of their calls so that the
//! instrumentation has something to report under load. With the default
//! rate of zero nothing is ever injected.

use crate::error::ServiceError;
use anyhow::anyhow;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultInjector {
    rate: f64,
}

impl FaultInjector {
    /// `rate` is clamped to `0.0..=1.0`; NaN and infinities disable
    /// injection.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() {
            rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { rate }
    }

    pub fn disabled() -> Self {
        Self::new(0.0)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn trips(&self) -> bool {
        self.rate > 0.0 && rand::thread_rng().gen_bool(self.rate)
    }

    /// Fail `operation` as an internal error.
    pub fn internal(&self, operation: &str) -> Result<(), ServiceError> {
        if self.trips() {
            return Err(ServiceError::Internal(anyhow!(
                "Simulated failure during {operation}"
            )));
        }
        Ok(())
    }

    /// Reject the caller's input with `message`.
    pub fn reject(&self, message: &str) -> Result<(), ServiceError> {
        if self.trips() {
            return Err(ServiceError::BadRequest(message.to_string()));
        }
        Ok(())
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::disabled()
    }
}
