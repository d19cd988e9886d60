//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the intake flow domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{FieldErrors, ValidationError};
pub use ids::{
    ClinicId, FormId, OrderId, PaymentIntentId, PlanId, ProductId, QuestionId, StepId,
    TabSessionId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
