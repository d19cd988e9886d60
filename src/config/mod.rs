//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `INTAKE_FLOW` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use intake_flow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend at {}", config.api.base_url);
//! ```

mod analytics;
mod api;
mod error;
mod flow;

pub use analytics::AnalyticsConfig;
pub use api::ApiConfig;
pub use error::{ConfigError, ValidationError};
pub use flow::FlowConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Backend API configuration (base URL, timeouts)
    #[serde(default)]
    pub api: ApiConfig,

    /// Flow timings (auto-advance, MFA forced exit)
    #[serde(default)]
    pub flow: FlowConfig,

    /// Analytics configuration (dedup window)
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables
    /// with the `INTAKE_FLOW` prefix:
    ///
    /// - `INTAKE_FLOW__API__BASE_URL=https://api.example.com`
    /// - `INTAKE_FLOW__FLOW__AUTO_ADVANCE_DELAY_MS=300`
    /// - `INTAKE_FLOW__ANALYTICS__DEDUP_WINDOW_SECS=5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the
    /// expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTAKE_FLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        self.flow.validate()?;
        self.analytics.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3001");
        assert_eq!(config.flow.auto_advance_delay_ms, 300);
        assert_eq!(config.analytics.dedup_window_secs, 5);
    }

    #[test]
    fn out_of_range_timings_fail_validation() {
        let mut config = AppConfig::default();
        config.flow.auto_advance_delay_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.analytics.dedup_window_secs = 100_000;
        assert!(config.validate().is_err());
    }
}
