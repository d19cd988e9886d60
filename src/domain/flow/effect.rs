//! Side effects requested by the reducer.

use secrecy::SecretString;

use crate::domain::analytics::TrackedEvent;
use crate::domain::foundation::{OrderId, PlanId, UserId};

/// Identity fields gathered from the answer store for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

/// A side effect the application layer must execute.
///
/// The reducer never performs I/O; it returns these descriptions and
/// the orchestrator runs them against the ports, feeding results back
/// in as new [`super::FlowEvent`]s.
#[derive(Debug)]
pub enum Effect {
    /// Fetch the questionnaire (explicit form or by treatment).
    LoadQuestionnaire,
    /// Replace the page URL without a reload, after stripping OAuth
    /// parameters.
    ReplaceUrl(String),

    /// Start the auto-advance delay for a committed single choice.
    ScheduleAutoAdvance { from_index: usize },
    /// Start the forced-exit delay after a terminal MFA failure.
    ScheduleMfaExit,

    SignIn { email: String, password: SecretString },
    SignUp(SignUpFields),
    SendVerificationCode { email: String },
    VerifyCode { email: String, code: String },
    VerifyMfa { mfa_token: SecretString, code: String },

    /// Request a payment intent for the selected plan. The orchestrator
    /// assembles the full request from current answers and shipping.
    CreatePaymentIntent {
        plan_id: PlanId,
        stripe_price_id: Option<String>,
    },
    /// Best-effort post-checkout sequence trigger.
    TriggerCheckoutSequence {
        user_id: UserId,
        order_id: Option<OrderId>,
    },

    /// Deliver an analytics event, awaited.
    Track(TrackedEvent),
    /// Deliver an analytics event fire-and-forget (page unload).
    Beacon(TrackedEvent),
}
