//! Strongly-typed identifier value objects.
//!
//! Most identifiers in the intake flow are minted by the backend and
//! arrive as opaque strings; they are wrapped in newtypes so a question
//! id can never be passed where a plan id is expected. The per-tab
//! session id is the one identifier generated locally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $field:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new id, returning an error if empty.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// User identifier minted by the auth backend.
    UserId,
    "user_id"
);

string_id!(
    /// Product (treatment) identifier.
    ProductId,
    "product_id"
);

string_id!(
    /// Questionnaire form identifier.
    FormId,
    "form_id"
);

string_id!(
    /// Clinic identifier, used for merchant-of-record billing.
    ClinicId,
    "clinic_id"
);

string_id!(
    /// Identifier of a single questionnaire step.
    StepId,
    "step_id"
);

string_id!(
    /// Identifier of a question within a step; also the answer key.
    QuestionId,
    "question_id"
);

string_id!(
    /// Billing plan identifier.
    PlanId,
    "plan_id"
);

string_id!(
    /// Payment intent (or subscription) identifier from the payment backend.
    PaymentIntentId,
    "payment_intent_id"
);

string_id!(
    /// Order identifier assigned when a payment intent is created.
    OrderId,
    "order_id"
);

/// Analytics session identifier, generated once per browser tab.
///
/// Persists across modal open/close cycles within the same tab load,
/// so repeated opens share one funnel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabSessionId(Uuid);

impl TabSessionId {
    /// Creates a new random TabSessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TabSessionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TabSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TabSessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
