//! In-memory fakes: scripted, recording implementations of every port.
//!
//! Used by the integration tests and handy for demos without a backend.

mod fixed_clock;
mod mock_auth;
mod recording_analytics;
mod recording_sequences;
mod static_forms;
mod stub_payments;

pub use fixed_clock::FixedClock;
pub use mock_auth::{auth_success, code_verification_existing, code_verification_new, AuthCall, MockAuthApi};
pub use recording_analytics::{Delivery, RecordingAnalyticsSink};
pub use recording_sequences::RecordingSequenceTrigger;
pub use static_forms::StaticQuestionnaireSource;
pub use stub_payments::{test_intent, StubPaymentApi};
