//! Everything that can happen to the flow.

use secrecy::SecretString;

use crate::domain::answers::AnswerValue;
use crate::domain::auth::{Identity, MfaVerifyFailure};
use crate::domain::foundation::{FormId, PlanId};
use crate::domain::payment::PaymentIntent;
use crate::domain::questionnaire::Questionnaire;

/// A completed authentication delivered by any sub-flow's backend call.
#[derive(Debug)]
pub struct AuthPayload {
    pub identity: Identity,
    pub token: SecretString,
}

/// Input to the reducer: user interactions, elapsed timers, and the
/// results of backend calls. The reducer is the only writer of
/// [`super::FlowState`]; every adapter outcome comes back through here.
#[derive(Debug)]
pub enum FlowEvent {
    /// The modal opened on a page; the URL may carry an OAuth signal.
    ModalOpened { page_url: String },
    ModalClosed,
    /// The hosting page is being torn down.
    PageUnloading,

    QuestionnaireLoaded {
        form_id: FormId,
        questionnaire: Questionnaire,
    },
    QuestionnaireLoadFailed { message: String },

    /// A free-form answer edit (text, number, multi-select toggle).
    AnswerChanged { key: String, value: AnswerValue },
    /// A single-choice answer was picked; eligible for auto-advance.
    SingleChoiceCommitted { key: String, value: AnswerValue },
    StepAdvanceRequested,
    StepRetreatRequested,
    /// The auto-advance delay elapsed for a choice committed while the
    /// pointer sat at `from_index`.
    AutoAdvanceElapsed { from_index: usize },

    PasswordFlowOpened,
    AuthFlowDismissed,
    PasswordSignInRequested { email: String, password: SecretString },
    /// Any sub-flow's backend call completed with an authentication.
    SignInSucceeded(AuthPayload),
    SignInFailed { message: String },

    EmailCodeRequested { email: String },
    EmailCodeSubmitted { code: String },
    /// Code accepted; `auth` is present only for existing accounts.
    EmailCodeVerified { auth: Option<AuthPayload> },
    EmailCodeRejected { message: String },

    MfaDigitTyped { ch: char },
    MfaBackspace,
    MfaPasted { text: String },
    MfaSubmitted,
    MfaFailed { failure: MfaVerifyFailure },
    /// The forced-exit delay after a terminal MFA failure elapsed.
    MfaExitElapsed,

    PlanSelected { plan_id: PlanId },
    PaymentIntentReady { intent: PaymentIntent },
    PaymentIntentFailed { message: String },
    /// Client-side payment confirmation succeeded.
    PaymentConfirmed,
    PaymentFailed { message: String },
}
