//! Flow timing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timings for the flow's scheduled transitions
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    /// Delay before a committed single-choice answer advances the step
    #[serde(default = "default_auto_advance_delay_ms")]
    pub auto_advance_delay_ms: u64,

    /// How long a terminal MFA failure stays on screen before the
    /// challenge is dismissed
    #[serde(default = "default_mfa_exit_delay_ms")]
    pub mfa_exit_delay_ms: u64,
}

impl FlowConfig {
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }

    pub fn mfa_exit_delay(&self) -> Duration {
        Duration::from_millis(self.mfa_exit_delay_ms)
    }

    /// Validate flow timings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.auto_advance_delay_ms == 0 || self.auto_advance_delay_ms > 5_000 {
            return Err(ValidationError::InvalidAutoAdvanceDelay);
        }
        if self.mfa_exit_delay_ms == 0 || self.mfa_exit_delay_ms > 30_000 {
            return Err(ValidationError::InvalidMfaExitDelay);
        }
        Ok(())
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            auto_advance_delay_ms: default_auto_advance_delay_ms(),
            mfa_exit_delay_ms: default_mfa_exit_delay_ms(),
        }
    }
}

fn default_auto_advance_delay_ms() -> u64 {
    300
}

fn default_mfa_exit_delay_ms() -> u64 {
    3_000
}
