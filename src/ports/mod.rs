//! Ports - contracts for all external collaborators.
//!
//! Every network-facing concern of the flow engine sits behind an
//! `async_trait` port: the auth backend, the payment backend, analytics
//! ingestion, the post-checkout trigger, and the questionnaire loader
//! boundary. HTTP adapters implement them for the real backend;
//! in-memory fakes implement them for tests.

mod analytics_sink;
mod auth_api;
mod clock;
mod payment_api;
mod questionnaire_source;
mod sequence_trigger;

pub use analytics_sink::AnalyticsSink;
pub use auth_api::{AuthApi, AuthApiError, AuthSuccess, CodeVerification, SignUpRequest};
pub use clock::{Clock, SystemClock};
pub use payment_api::{PaymentApi, PaymentIntentRequest, ShippingInfo};
pub use questionnaire_source::QuestionnaireSource;
pub use sequence_trigger::SequenceTriggerApi;

use thiserror::Error;

/// Transport-level errors shared by all HTTP-backed ports.
///
/// These surface to the visitor as a generic retryable message; the
/// flow stays on the current step.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Unreadable response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network(message.into())
    }

    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        ApiError::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_its_detail() {
        assert_eq!(
            format!("{}", ApiError::network("connection refused")),
            "Network error: connection refused"
        );
        assert_eq!(
            format!("{}", ApiError::backend(502, "bad gateway")),
            "Backend returned 502: bad gateway"
        );
    }
}
