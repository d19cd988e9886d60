//! Analytics configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Analytics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Window during which identically-keyed events are dropped
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,
}

impl AnalyticsConfig {
    /// Validate analytics configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dedup_window_secs == 0 || self.dedup_window_secs > 3_600 {
            return Err(ValidationError::InvalidDedupWindow);
        }
        Ok(())
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            dedup_window_secs: default_dedup_window_secs(),
        }
    }
}

fn default_dedup_window_secs() -> u64 {
    5
}
