//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid API base URL")]
    InvalidBaseUrl,

    #[error("Auto-advance delay out of range (1..=5000 ms)")]
    InvalidAutoAdvanceDelay,

    #[error("MFA exit delay out of range (1..=30000 ms)")]
    InvalidMfaExitDelay,

    #[error("Analytics dedup window out of range (1..=3600 s)")]
    InvalidDedupWindow,
}
