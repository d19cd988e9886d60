//! HTTP adapters for the real backend.
//!
//! All of them share one [`BackendClient`] built from [`crate::config::ApiConfig`].

mod analytics;
mod auth;
mod client;
mod payments;
mod questionnaire;
mod sequence_trigger;

pub use analytics::HttpAnalyticsSink;
pub use auth::HttpAuthApi;
pub use client::BackendClient;
pub use payments::HttpPaymentApi;
pub use questionnaire::HttpQuestionnaireSource;
pub use sequence_trigger::HttpSequenceTriggerApi;
