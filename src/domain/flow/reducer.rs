//! The single reducer: every state change flows through here.
//!
//! `reduce` is synchronous and pure apart from tracing: it mutates the
//! [`FlowState`] and returns the side effects the application layer
//! must execute. Backend call results come back in as further events,
//! so there is exactly one writer of flow state and no mutation from
//! async callbacks.

use super::effect::{Effect, SignUpFields};
use super::event::{AuthPayload, FlowEvent};
use super::state::FlowState;
use crate::domain::analytics::{DeliveryChannel, DropOffStage};
use crate::domain::answers::identity_keys;
use crate::domain::auth::{
    parse_oauth_callback, ActiveAuthFlow, EmailCodeFlow, MfaChallenge, MfaStatus,
    MfaVerifyFailure, OauthOutcome,
};
use crate::domain::foundation::Timestamp;
use crate::domain::sequencer::AdvanceOutcome;

/// Applies one event to the flow state, returning the effects to run.
pub fn reduce(state: &mut FlowState, event: FlowEvent, now: Timestamp) -> Vec<Effect> {
    match event {
        FlowEvent::ModalOpened { page_url } => on_modal_opened(state, &page_url, now),
        FlowEvent::ModalClosed => on_modal_closed(state, now),
        FlowEvent::PageUnloading => on_page_unloading(state, now),

        FlowEvent::QuestionnaireLoaded { form_id, questionnaire } => {
            state.form_id = Some(form_id);
            state.questionnaire = Some(questionnaire);
            state.load_error = None;
            state.plans = crate::domain::payment::resolve_plans(
                state.product.tiered_plans.clone(),
                state.product.flat_price_cents,
                &state.product.product_name,
            );
            if state.open {
                ensure_session_started(state, now)
            } else {
                Vec::new()
            }
        }
        FlowEvent::QuestionnaireLoadFailed { message } => {
            tracing::warn!(%message, "questionnaire load failed");
            state.load_error = Some(message);
            Vec::new()
        }

        FlowEvent::AnswerChanged { key, value } => {
            state.auto_advance_from = None;
            state.answers.set(key, value);
            Vec::new()
        }
        FlowEvent::SingleChoiceCommitted { key, value } => {
            state.answers.set(key.clone(), value);
            schedule_auto_advance(state, &key)
        }
        FlowEvent::StepAdvanceRequested => {
            state.auto_advance_from = None;
            handle_advance(state)
        }
        FlowEvent::StepRetreatRequested => {
            state.auto_advance_from = None;
            if let Some(q) = state.questionnaire.as_ref() {
                let authenticated = state.auth.is_authenticated();
                state.sequencer.retreat(q, &state.answers, authenticated);
            }
            sync_stage(state);
            Vec::new()
        }
        FlowEvent::AutoAdvanceElapsed { from_index } => {
            if state.auto_advance_from == Some(from_index)
                && state.sequencer.current_index() == from_index
            {
                state.auto_advance_from = None;
                handle_advance(state)
            } else {
                // the visitor navigated or edited in the meantime
                Vec::new()
            }
        }

        FlowEvent::PasswordFlowOpened => {
            state.auth.active_flow = Some(ActiveAuthFlow::Password);
            state.auth.error_message = None;
            Vec::new()
        }
        FlowEvent::AuthFlowDismissed => {
            state.auth.active_flow = None;
            state.auth.error_message = None;
            Vec::new()
        }
        FlowEvent::PasswordSignInRequested { email, password } => {
            if state.is_signing_in {
                return Vec::new();
            }
            state.is_signing_in = true;
            state.auth.error_message = None;
            vec![Effect::SignIn { email, password }]
        }
        FlowEvent::SignInSucceeded(payload) => complete_auth(state, payload, now),
        FlowEvent::SignInFailed { message } => {
            state.is_signing_in = false;
            state.saving = false;
            state.auth.error_message = Some(message);
            Vec::new()
        }

        FlowEvent::EmailCodeRequested { email } => match EmailCodeFlow::request(email.clone()) {
            Ok(flow) => {
                state.auth.active_flow = Some(ActiveAuthFlow::EmailCode(flow));
                state.auth.error_message = None;
                vec![Effect::SendVerificationCode { email }]
            }
            Err(_) => {
                state.auth.error_message = Some("Enter a valid email address".to_string());
                Vec::new()
            }
        },
        FlowEvent::EmailCodeSubmitted { code } => {
            let Some(ActiveAuthFlow::EmailCode(flow)) = state.auth.active_flow.as_mut() else {
                return Vec::new();
            };
            if flow.begin_verify().is_err() {
                return Vec::new();
            }
            vec![Effect::VerifyCode {
                email: flow.email().to_string(),
                code,
            }]
        }
        FlowEvent::EmailCodeVerified { auth } => on_email_code_verified(state, auth, now),
        FlowEvent::EmailCodeRejected { message } => {
            if let Some(ActiveAuthFlow::EmailCode(flow)) = state.auth.active_flow.as_mut() {
                if flow.retry().is_err() {
                    tracing::warn!("code rejection arrived with no verify in flight");
                }
            }
            state.auth.error_message = Some(message);
            Vec::new()
        }

        FlowEvent::MfaDigitTyped { ch } => {
            if let Some(ActiveAuthFlow::Mfa(challenge)) = state.auth.active_flow.as_mut() {
                challenge.input_digit(ch);
            }
            Vec::new()
        }
        FlowEvent::MfaBackspace => {
            if let Some(ActiveAuthFlow::Mfa(challenge)) = state.auth.active_flow.as_mut() {
                challenge.backspace();
            }
            Vec::new()
        }
        FlowEvent::MfaPasted { text } => {
            if let Some(ActiveAuthFlow::Mfa(challenge)) = state.auth.active_flow.as_mut() {
                challenge.paste(&text);
            }
            Vec::new()
        }
        FlowEvent::MfaSubmitted => {
            let Some(ActiveAuthFlow::Mfa(challenge)) = state.auth.active_flow.as_mut() else {
                return Vec::new();
            };
            let Some(code) = challenge.code() else {
                return Vec::new();
            };
            if !challenge.begin_verify() {
                return Vec::new();
            }
            vec![Effect::VerifyMfa {
                mfa_token: challenge.mfa_token().clone(),
                code,
            }]
        }
        FlowEvent::MfaFailed { failure } => {
            let Some(ActiveAuthFlow::Mfa(challenge)) = state.auth.active_flow.as_mut() else {
                return Vec::new();
            };
            let terminal = matches!(
                failure,
                MfaVerifyFailure::Expired | MfaVerifyFailure::RateLimited
            );
            challenge.apply_failure(failure);
            if terminal {
                vec![Effect::ScheduleMfaExit]
            } else {
                Vec::new()
            }
        }
        FlowEvent::MfaExitElapsed => {
            if let Some(ActiveAuthFlow::Mfa(challenge)) = state.auth.active_flow.as_ref() {
                if matches!(
                    challenge.status(),
                    MfaStatus::Expired | MfaStatus::RateLimited
                ) {
                    state.auth.active_flow = None;
                }
            }
            Vec::new()
        }

        FlowEvent::PlanSelected { plan_id } => {
            let Some(plan) = state.plans.iter().find(|p| p.id == plan_id).cloned() else {
                tracing::warn!(plan = %plan_id.as_str(), "unknown plan selected");
                return Vec::new();
            };
            match state.payment.select_plan(plan.id.clone()) {
                Ok(()) => vec![Effect::CreatePaymentIntent {
                    plan_id: plan.id,
                    stripe_price_id: plan.stripe_price_id,
                }],
                Err(reason) => {
                    tracing::warn!(%reason, "plan selection rejected");
                    Vec::new()
                }
            }
        }
        FlowEvent::PaymentIntentReady { intent } => {
            state.payment.intent_ready(intent);
            Vec::new()
        }
        FlowEvent::PaymentIntentFailed { message } | FlowEvent::PaymentFailed { message } => {
            if let Err(reason) = state.payment.fail(message) {
                tracing::warn!(%reason, "payment failure arrived in a non-processing state");
            }
            Vec::new()
        }
        FlowEvent::PaymentConfirmed => on_payment_confirmed(state, now),
    }
}

fn on_modal_opened(state: &mut FlowState, page_url: &str, now: Timestamp) -> Vec<Effect> {
    state.open = true;
    let mut effects = Vec::new();

    if !state.oauth_handled {
        state.oauth_handled = true;
        if let Some(callback) = parse_oauth_callback(page_url) {
            effects.push(Effect::ReplaceUrl(callback.stripped_url));
            match callback.outcome {
                OauthOutcome::Success { identity, token } => {
                    state.auth.set_identity(identity, Some(token));
                }
                OauthOutcome::MfaRequired { mfa_token, masked_email } => {
                    state.auth.active_flow =
                        Some(ActiveAuthFlow::Mfa(MfaChallenge::new(mfa_token, masked_email)));
                }
                OauthOutcome::Error { message } => {
                    state.auth.error_message = Some(message);
                }
            }
        }
    }

    effects.extend(ensure_session_started(state, now));
    effects
}

/// Seats the step pointer, records the funnel stage, and fires the view
/// event once the questionnaire is available. Requests the load when it
/// is not.
fn ensure_session_started(state: &mut FlowState, now: Timestamp) -> Vec<Effect> {
    let Some(q) = state.questionnaire.as_ref() else {
        return vec![Effect::LoadQuestionnaire];
    };

    let authenticated = state.auth.is_authenticated();
    if state.step_initialized {
        state.sequencer.resync(q, &state.answers, authenticated);
    } else {
        state.sequencer.initialize(q, &state.answers, authenticated);
        state.step_initialized = true;
    }
    sync_stage(state);

    let mut effects = Vec::new();
    if let Some(ctx) = state.tracking_context() {
        if let Some(event) = state.tracker.track_view(&ctx, now) {
            effects.push(Effect::Track(event));
        }
    }
    effects
}

fn on_modal_closed(state: &mut FlowState, now: Timestamp) -> Vec<Effect> {
    let mut effects = Vec::new();
    if let Some(ctx) = state.tracking_context() {
        if let Some((event, _)) = state
            .tracker
            .track_drop_off(&ctx, DeliveryChannel::Fetch, now)
        {
            effects.push(Effect::Track(event));
        }
    }

    state.open = false;
    state.completed = false;
    state.answers.reset();
    state.sequencer.reset();
    state.auth.reset();
    state.payment.reset();
    state.tracker.end_session();
    state.step_initialized = false;
    state.oauth_handled = false;
    state.saving = false;
    state.is_signing_in = false;
    state.auto_advance_from = None;
    state.epoch += 1;
    effects
}

fn on_page_unloading(state: &mut FlowState, now: Timestamp) -> Vec<Effect> {
    let Some(ctx) = state.tracking_context() else {
        return Vec::new();
    };
    match state
        .tracker
        .track_drop_off(&ctx, DeliveryChannel::Beacon, now)
    {
        Some((event, _)) => vec![Effect::Beacon(event)],
        None => Vec::new(),
    }
}

/// Advances past the current step, or intercepts the advance to create
/// an account when leaving the identity step unauthenticated.
fn handle_advance(state: &mut FlowState) -> Vec<Effect> {
    let Some(q) = state.questionnaire.as_ref() else {
        return Vec::new();
    };
    let authenticated = state.auth.is_authenticated();

    if !authenticated && !state.sequencer.is_on_checkout(q) {
        let on_identity_step = state
            .sequencer
            .current_step(q, &state.answers, authenticated)
            .is_some_and(|step| step.is_user_profile());
        if on_identity_step {
            if state.saving {
                return Vec::new();
            }
            let step = state
                .sequencer
                .current_step(q, &state.answers, authenticated)
                .cloned();
            if let Some(step) = step {
                if !crate::domain::sequencer::validate_step(&step, &mut state.answers) {
                    return Vec::new();
                }
            }
            state.saving = true;
            let field = |key: &str| state.answers.get_text(key).unwrap_or_default();
            return vec![Effect::SignUp(SignUpFields {
                first_name: field(identity_keys::FIRST_NAME),
                last_name: field(identity_keys::LAST_NAME),
                email: field(identity_keys::EMAIL),
                phone_number: field(identity_keys::MOBILE),
            })];
        }
    }

    let outcome =
        state
            .sequencer
            .advance(q, &mut state.answers, authenticated, state.payment.status());
    if outcome == AdvanceOutcome::Submit {
        state.completed = true;
    }
    sync_stage(state);
    Vec::new()
}

/// Auto-advance only when the committed choice belongs to the current
/// step and that step now validates.
fn schedule_auto_advance(state: &mut FlowState, key: &str) -> Vec<Effect> {
    let Some(q) = state.questionnaire.as_ref() else {
        return Vec::new();
    };
    let authenticated = state.auth.is_authenticated();
    let index = state.sequencer.current_index();
    let Some(step) = state.sequencer.current_step(q, &state.answers, authenticated) else {
        return Vec::new();
    };
    let belongs = step.questions.iter().any(|question| {
        question.id.as_str() == key && question.answer_type.is_choice()
    });
    if !belongs || !crate::domain::sequencer::step_is_valid(step, &state.answers) {
        state.auto_advance_from = None;
        return Vec::new();
    }
    state.auto_advance_from = Some(index);
    vec![Effect::ScheduleAutoAdvance { from_index: index }]
}

fn complete_auth(state: &mut FlowState, payload: AuthPayload, now: Timestamp) -> Vec<Effect> {
    state.is_signing_in = false;
    state.saving = false;

    let AuthPayload { identity, token } = payload;
    let prefill = [
        (identity_keys::FIRST_NAME, identity.first_name.clone()),
        (identity_keys::LAST_NAME, identity.last_name.clone()),
        (identity_keys::EMAIL, identity.email.clone()),
        (identity_keys::MOBILE, identity.phone_number.clone()),
    ];
    if !state.auth.set_identity(identity, Some(token)) {
        return Vec::new();
    }
    for (key, value) in prefill {
        if !value.is_empty() {
            state.answers.set(key, value.into());
        }
    }

    if let Some(q) = state.questionnaire.as_ref() {
        state.sequencer.resync(q, &state.answers, true);
    }
    sync_stage(state);

    // authenticated late: the view may still be waiting on an identity
    let mut effects = Vec::new();
    if let Some(ctx) = state.tracking_context() {
        if let Some(event) = state.tracker.track_view(&ctx, now) {
            effects.push(Effect::Track(event));
        }
    }
    effects
}

fn on_email_code_verified(
    state: &mut FlowState,
    auth: Option<AuthPayload>,
    now: Timestamp,
) -> Vec<Effect> {
    let email = {
        let Some(ActiveAuthFlow::EmailCode(flow)) = state.auth.active_flow.as_mut() else {
            return Vec::new();
        };
        if flow.complete().is_err() {
            tracing::warn!("code verification arrived with no verify in flight");
            return Vec::new();
        }
        flow.email().to_string()
    };

    match auth {
        Some(payload) => complete_auth(state, payload, now),
        None => {
            // brand new account: only the email is confirmed, the
            // visitor keeps filling the identity step
            state.auth.active_flow = None;
            state.auth.confirmed_email = Some(email.clone());
            state.answers.set(identity_keys::EMAIL, email.into());
            Vec::new()
        }
    }
}

fn on_payment_confirmed(state: &mut FlowState, now: Timestamp) -> Vec<Effect> {
    if let Err(reason) = state.payment.confirm() {
        tracing::warn!(%reason, "payment confirmation arrived in a non-processing state");
        return Vec::new();
    }

    let mut effects = Vec::new();
    if let Some(ctx) = state.tracking_context() {
        if let Some(event) = state.tracker.track_conversion(&ctx, now) {
            effects.push(Effect::Track(event));
        }
    }
    if let Some(identity) = state.auth.identity() {
        effects.push(Effect::TriggerCheckoutSequence {
            user_id: identity.user_id.clone(),
            order_id: state.payment.intent().and_then(|i| i.order_id.clone()),
        });
    }
    effects
}

fn sync_stage(state: &mut FlowState) {
    let Some(q) = state.questionnaire.as_ref() else {
        return;
    };
    let authenticated = state.auth.is_authenticated();
    let stage = if state.sequencer.is_on_checkout(q) {
        DropOffStage::Payment
    } else if state
        .sequencer
        .current_step(q, &state.answers, authenticated)
        .is_some_and(|step| step.is_user_profile())
    {
        DropOffStage::Account
    } else {
        DropOffStage::Product
    };
    state.tracker.record_stage(stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::state::ProductContext;
    use crate::domain::analytics::EventType;
    use crate::domain::answers::AnswerValue;
    use crate::domain::auth::Identity;
    use crate::domain::foundation::{
        FormId, PaymentIntentId, PlanId, ProductId, QuestionId, StepId, TabSessionId, Timestamp,
        UserId,
    };
    use crate::domain::payment::{
        BillingInterval, PaymentIntent, PaymentStatus, PlanOption,
    };
    use crate::domain::questionnaire::{AnswerType, Question, Questionnaire, Step, StepCategory};
    use secrecy::SecretString;

    fn product() -> ProductContext {
        ProductContext {
            product_id: ProductId::new("prod-1").unwrap(),
            form_id: None,
            clinic_id: None,
            clinic_merchant_of_record: false,
            product_name: "Semaglutide".to_string(),
            flat_price_cents: Some(29_900),
            tiered_plans: Vec::new(),
        }
    }

    fn state() -> FlowState {
        FlowState::new(product(), TabSessionId::new(), 5)
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_millis(secs * 1_000)
    }

    fn choice_question(id: &str) -> Question {
        Question {
            id: QuestionId::new(id).unwrap(),
            question_text: id.to_string(),
            answer_type: AnswerType::SingleChoice,
            is_required: true,
            conditional_logic: None,
            conditional_level: None,
            options: vec![],
        }
    }

    fn step(id: &str, category: StepCategory, questions: Vec<Question>) -> Step {
        Step {
            id: StepId::new(id).unwrap(),
            title: id.to_string(),
            description: String::new(),
            category,
            conditional_logic: None,
            questions,
        }
    }

    fn questionnaire() -> Questionnaire {
        Questionnaire::new(vec![
            step("s0", StepCategory::Normal, vec![choice_question("q0")]),
            step("s1", StepCategory::UserProfile, vec![]),
        ])
    }

    fn identity() -> Identity {
        Identity::new(
            UserId::new("u-1").unwrap(),
            "Ada",
            "Lovelace",
            "ada@example.com",
            "555-0100",
        )
    }

    fn auth_payload() -> AuthPayload {
        AuthPayload {
            identity: identity(),
            token: SecretString::new("tok".to_string()),
        }
    }

    fn opened_state() -> FlowState {
        let mut s = state();
        let effects = reduce(
            &mut s,
            FlowEvent::ModalOpened {
                page_url: "https://clinic.example.com/intake".to_string(),
            },
            at(0),
        );
        assert!(matches!(effects.as_slice(), [Effect::LoadQuestionnaire]));
        let effects = reduce(
            &mut s,
            FlowEvent::QuestionnaireLoaded {
                form_id: FormId::new("form-1").unwrap(),
                questionnaire: questionnaire(),
            },
            at(0),
        );
        assert!(matches!(effects.as_slice(), [Effect::Track(_)]));
        s
    }

    #[test]
    fn opening_loads_then_tracks_a_view() {
        let s = opened_state();
        assert!(s.tracker.view_tracked());
        assert!(s.step_initialized);
        assert_eq!(s.plans.len(), 1);
        assert_eq!(s.plans[0].name, "Semaglutide Monthly");
    }

    #[test]
    fn reopening_does_not_track_a_second_view_inside_the_window() {
        let mut s = opened_state();
        reduce(&mut s, FlowEvent::ModalClosed, at(1));
        let effects = reduce(
            &mut s,
            FlowEvent::ModalOpened {
                page_url: "https://clinic.example.com/intake".to_string(),
            },
            at(2),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn oauth_success_in_the_url_authenticates_and_strips_params() {
        let user = r#"{"id":"u-9","firstName":"Ada","lastName":"Lovelace","email":"ada@example.com"}"#;
        let encoded: String = url::form_urlencoded::byte_serialize(user.as_bytes()).collect();
        let url = format!(
            "https://clinic.example.com/intake?googleAuth=success&token=t1&user={}",
            encoded
        );

        let mut s = state();
        let effects = reduce(&mut s, FlowEvent::ModalOpened { page_url: url }, at(0));

        assert!(s.authenticated());
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::ReplaceUrl(u) if !u.contains("googleAuth"))));
        assert!(s.oauth_handled);
    }

    #[test]
    fn oauth_mfa_required_opens_the_challenge() {
        let url =
            "https://clinic.example.com/intake?googleAuth=mfa_required&mfaToken=m1&email=a%40b.com";
        let mut s = state();
        reduce(
            &mut s,
            FlowEvent::ModalOpened { page_url: url.to_string() },
            at(0),
        );
        assert!(matches!(s.auth.active_flow, Some(ActiveAuthFlow::Mfa(_))));
    }

    #[test]
    fn oauth_is_processed_at_most_once() {
        let url = "https://clinic.example.com/intake?googleAuth=error";
        let mut s = state();
        reduce(
            &mut s,
            FlowEvent::ModalOpened { page_url: url.to_string() },
            at(0),
        );
        assert!(s.auth.error_message.is_some());

        s.auth.error_message = None;
        let effects = reduce(
            &mut s,
            FlowEvent::ModalOpened { page_url: url.to_string() },
            at(1),
        );
        assert!(s.auth.error_message.is_none());
        assert!(!effects.iter().any(|e| matches!(e, Effect::ReplaceUrl(_))));
    }

    #[test]
    fn committed_choice_schedules_auto_advance_once_the_step_validates() {
        let mut s = opened_state();
        let effects = reduce(
            &mut s,
            FlowEvent::SingleChoiceCommitted {
                key: "q0".to_string(),
                value: AnswerValue::from("yes"),
            },
            at(1),
        );
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScheduleAutoAdvance { from_index: 0 }]
        ));

        let effects = reduce(&mut s, FlowEvent::AutoAdvanceElapsed { from_index: 0 }, at(1));
        assert!(effects.is_empty());
        assert_eq!(s.sequencer.current_index(), 1);
    }

    #[test]
    fn editing_an_answer_cancels_a_pending_auto_advance() {
        let mut s = opened_state();
        reduce(
            &mut s,
            FlowEvent::SingleChoiceCommitted {
                key: "q0".to_string(),
                value: AnswerValue::from("yes"),
            },
            at(1),
        );
        reduce(
            &mut s,
            FlowEvent::AnswerChanged {
                key: "q0".to_string(),
                value: AnswerValue::from("no"),
            },
            at(1),
        );

        reduce(&mut s, FlowEvent::AutoAdvanceElapsed { from_index: 0 }, at(2));
        assert_eq!(s.sequencer.current_index(), 0);
    }

    #[test]
    fn advancing_off_the_identity_step_unauthenticated_signs_up() {
        let mut s = opened_state();
        s.answers.set("q0", AnswerValue::from("yes"));
        reduce(&mut s, FlowEvent::StepAdvanceRequested, at(1));
        assert_eq!(s.sequencer.current_index(), 1);

        // missing identity fields block with errors, no signup fires
        let effects = reduce(&mut s, FlowEvent::StepAdvanceRequested, at(1));
        assert!(effects.is_empty());
        assert!(!s.answers.errors().is_empty());

        for (key, value) in [
            (identity_keys::FIRST_NAME, "Ada"),
            (identity_keys::LAST_NAME, "Lovelace"),
            (identity_keys::EMAIL, "ada@example.com"),
            (identity_keys::MOBILE, "555-0100"),
        ] {
            s.answers.set(key, AnswerValue::from(value));
        }

        let effects = reduce(&mut s, FlowEvent::StepAdvanceRequested, at(1));
        match effects.as_slice() {
            [Effect::SignUp(fields)] => {
                assert_eq!(fields.email, "ada@example.com");
                assert_eq!(fields.first_name, "Ada");
            }
            other => panic!("expected signup effect, got {:?}", other),
        }
        assert!(s.saving);
        // the pointer waits on the identity step until the signup lands
        assert_eq!(s.sequencer.current_index(), 1);

        reduce(&mut s, FlowEvent::SignInSucceeded(auth_payload()), at(2));
        assert!(!s.saving);
        assert!(s.authenticated());
        // the suppressed identity step is left behind without validation
        assert!(s.sequencer.is_on_checkout(s.questionnaire.as_ref().unwrap()));
    }

    #[test]
    fn password_sign_in_round_trip() {
        let mut s = opened_state();
        reduce(&mut s, FlowEvent::PasswordFlowOpened, at(1));

        let effects = reduce(
            &mut s,
            FlowEvent::PasswordSignInRequested {
                email: "ada@example.com".to_string(),
                password: SecretString::new("hunter2".to_string()),
            },
            at(1),
        );
        assert!(matches!(effects.as_slice(), [Effect::SignIn { .. }]));
        assert!(s.is_signing_in);

        // a second submit while in flight is ignored
        let effects = reduce(
            &mut s,
            FlowEvent::PasswordSignInRequested {
                email: "ada@example.com".to_string(),
                password: SecretString::new("hunter2".to_string()),
            },
            at(1),
        );
        assert!(effects.is_empty());

        reduce(
            &mut s,
            FlowEvent::SignInFailed { message: "Invalid email or password".to_string() },
            at(1),
        );
        assert!(!s.is_signing_in);
        assert_eq!(s.auth.error_message.as_deref(), Some("Invalid email or password"));

        reduce(
            &mut s,
            FlowEvent::PasswordSignInRequested {
                email: "ada@example.com".to_string(),
                password: SecretString::new("correct".to_string()),
            },
            at(2),
        );
        reduce(&mut s, FlowEvent::SignInSucceeded(auth_payload()), at(2));
        assert!(s.authenticated());
        assert!(s.auth.active_flow.is_none());
    }

    #[test]
    fn email_code_existing_account_authenticates() {
        let mut s = opened_state();
        let effects = reduce(
            &mut s,
            FlowEvent::EmailCodeRequested { email: "ada@example.com".to_string() },
            at(1),
        );
        assert!(matches!(effects.as_slice(), [Effect::SendVerificationCode { .. }]));

        let effects = reduce(
            &mut s,
            FlowEvent::EmailCodeSubmitted { code: "482913".to_string() },
            at(1),
        );
        assert!(matches!(effects.as_slice(), [Effect::VerifyCode { .. }]));

        reduce(
            &mut s,
            FlowEvent::EmailCodeVerified { auth: Some(auth_payload()) },
            at(2),
        );
        assert!(s.authenticated());
    }

    #[test]
    fn email_code_new_account_only_confirms_the_email() {
        let mut s = opened_state();
        reduce(
            &mut s,
            FlowEvent::EmailCodeRequested { email: "new@example.com".to_string() },
            at(1),
        );
        reduce(&mut s, FlowEvent::EmailCodeSubmitted { code: "482913".to_string() }, at(1));
        reduce(&mut s, FlowEvent::EmailCodeVerified { auth: None }, at(2));

        assert!(!s.authenticated());
        assert_eq!(s.auth.confirmed_email.as_deref(), Some("new@example.com"));
        assert_eq!(
            s.answers.get_text(identity_keys::EMAIL).as_deref(),
            Some("new@example.com")
        );
    }

    #[test]
    fn bad_email_address_never_reaches_the_network() {
        let mut s = opened_state();
        let effects = reduce(
            &mut s,
            FlowEvent::EmailCodeRequested { email: "nope".to_string() },
            at(1),
        );
        assert!(effects.is_empty());
        assert!(s.auth.error_message.is_some());
    }

    #[test]
    fn terminal_mfa_failure_schedules_a_forced_exit() {
        let url =
            "https://clinic.example.com/intake?googleAuth=mfa_required&mfaToken=m1&email=a%40b.com";
        let mut s = state();
        reduce(&mut s, FlowEvent::ModalOpened { page_url: url.to_string() }, at(0));

        reduce(&mut s, FlowEvent::MfaPasted { text: "123456".to_string() }, at(1));
        let effects = reduce(&mut s, FlowEvent::MfaSubmitted, at(1));
        assert!(matches!(effects.as_slice(), [Effect::VerifyMfa { .. }]));

        let effects = reduce(
            &mut s,
            FlowEvent::MfaFailed { failure: MfaVerifyFailure::Expired },
            at(2),
        );
        assert!(matches!(effects.as_slice(), [Effect::ScheduleMfaExit]));

        reduce(&mut s, FlowEvent::MfaExitElapsed, at(3));
        assert!(s.auth.active_flow.is_none());
    }

    #[test]
    fn wrong_mfa_code_keeps_the_challenge_alive() {
        let url =
            "https://clinic.example.com/intake?googleAuth=mfa_required&mfaToken=m1&email=a%40b.com";
        let mut s = state();
        reduce(&mut s, FlowEvent::ModalOpened { page_url: url.to_string() }, at(0));
        reduce(&mut s, FlowEvent::MfaPasted { text: "123456".to_string() }, at(1));
        reduce(&mut s, FlowEvent::MfaSubmitted, at(1));

        let effects = reduce(
            &mut s,
            FlowEvent::MfaFailed {
                failure: MfaVerifyFailure::WrongCode { attempts_remaining: Some(2) },
            },
            at(2),
        );
        assert!(effects.is_empty());
        match &s.auth.active_flow {
            Some(ActiveAuthFlow::Mfa(challenge)) => {
                assert_eq!(challenge.status(), MfaStatus::Entering);
                assert!(challenge.error_message().is_some());
            }
            other => panic!("expected live MFA challenge, got {:?}", other),
        }
    }

    fn intent() -> PaymentIntent {
        PaymentIntent {
            client_secret: "cs_1".to_string(),
            payment_intent_id: PaymentIntentId::new("pi_1").unwrap(),
            order_id: None,
        }
    }

    #[test]
    fn plan_selection_requests_an_intent() {
        let mut s = opened_state();
        let plan_id = s.plans[0].id.clone();
        let effects = reduce(&mut s, FlowEvent::PlanSelected { plan_id }, at(1));
        assert!(matches!(effects.as_slice(), [Effect::CreatePaymentIntent { .. }]));
        assert_eq!(s.payment.status(), PaymentStatus::Processing);

        reduce(&mut s, FlowEvent::PaymentIntentReady { intent: intent() }, at(1));
        assert!(s.payment.intent().is_some());
    }

    #[test]
    fn failed_payment_can_retry_by_reselecting_a_plan() {
        // Declined card, then a successful retry.
        let mut s = opened_state();
        let plan_id = s.plans[0].id.clone();
        reduce(&mut s, FlowEvent::PlanSelected { plan_id: plan_id.clone() }, at(1));
        reduce(&mut s, FlowEvent::PaymentIntentReady { intent: intent() }, at(1));
        reduce(
            &mut s,
            FlowEvent::PaymentFailed { message: "card declined".to_string() },
            at(2),
        );
        assert_eq!(s.payment.status(), PaymentStatus::Failed);
        assert_eq!(s.payment.failure_reason(), Some("card declined"));

        let effects = reduce(&mut s, FlowEvent::PlanSelected { plan_id }, at(3));
        assert!(matches!(effects.as_slice(), [Effect::CreatePaymentIntent { .. }]));
        assert_eq!(s.payment.status(), PaymentStatus::Processing);

        reduce(&mut s, FlowEvent::PaymentIntentReady { intent: intent() }, at(3));
        reduce(&mut s, FlowEvent::SignInSucceeded(auth_payload()), at(3));
        let effects = reduce(&mut s, FlowEvent::PaymentConfirmed, at(4));
        assert_eq!(s.payment.status(), PaymentStatus::Succeeded);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Track(event) if event.event_type == EventType::Conversion
        )));
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::TriggerCheckoutSequence { .. })));
    }

    #[test]
    fn unknown_plan_selection_is_ignored() {
        let mut s = opened_state();
        let effects = reduce(
            &mut s,
            FlowEvent::PlanSelected { plan_id: PlanId::new("nope").unwrap() },
            at(1),
        );
        assert!(effects.is_empty());
        assert_eq!(s.payment.status(), PaymentStatus::Idle);
    }

    #[test]
    fn unload_emits_a_beacon_drop_off_then_close_emits_nothing() {
        // Unload wins, the explicit close finds the guard set.
        let mut s = opened_state();
        let effects = reduce(&mut s, FlowEvent::PageUnloading, at(1));
        match effects.as_slice() {
            [Effect::Beacon(event)] => assert_eq!(event.event_type, EventType::DropOff),
            other => panic!("expected beacon, got {:?}", other),
        }

        let effects = reduce(&mut s, FlowEvent::ModalClosed, at(2));
        assert!(effects.is_empty());
    }

    #[test]
    fn conversion_suppresses_the_close_time_drop_off() {
        let mut s = opened_state();
        let plan_id = s.plans[0].id.clone();
        reduce(&mut s, FlowEvent::PlanSelected { plan_id }, at(1));
        reduce(&mut s, FlowEvent::SignInSucceeded(auth_payload()), at(1));
        reduce(&mut s, FlowEvent::PaymentConfirmed, at(2));

        let effects = reduce(&mut s, FlowEvent::ModalClosed, at(3));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::Track(event) if event.event_type == EventType::DropOff)));
    }

    #[test]
    fn close_emits_drop_off_with_the_last_stage_and_resets_the_session() {
        let mut s = opened_state();
        s.answers.set("q0", AnswerValue::from("yes"));
        reduce(&mut s, FlowEvent::StepAdvanceRequested, at(1));
        let epoch_before = s.epoch;

        let effects = reduce(&mut s, FlowEvent::ModalClosed, at(2));
        match effects.as_slice() {
            [Effect::Track(event)] => {
                assert_eq!(event.event_type, EventType::DropOff);
                assert_eq!(event.drop_off_stage, Some(DropOffStage::Account));
            }
            other => panic!("expected drop-off, got {:?}", other),
        }

        assert!(!s.open);
        assert!(!s.step_initialized);
        assert!(!s.authenticated());
        assert!(s.answers.get("q0").is_none());
        assert_eq!(s.payment.status(), PaymentStatus::Idle);
        assert_eq!(s.epoch, epoch_before + 1);
        // the questionnaire itself is cached across sessions
        assert!(s.questionnaire.is_some());
    }

    #[test]
    fn tiered_plans_win_over_the_flat_price() {
        let mut ctx = product();
        ctx.tiered_plans = vec![PlanOption {
            id: PlanId::new("tier-1").unwrap(),
            name: "Starter".to_string(),
            price_cents: 9_900,
            billing_interval: BillingInterval::Month,
            stripe_price_id: Some("price_1".to_string()),
            is_popular: false,
            sort_order: 0,
        }];
        let mut s = FlowState::new(ctx, TabSessionId::new(), 5);
        reduce(
            &mut s,
            FlowEvent::ModalOpened { page_url: "https://c.example.com/".to_string() },
            at(0),
        );
        reduce(
            &mut s,
            FlowEvent::QuestionnaireLoaded {
                form_id: FormId::new("form-1").unwrap(),
                questionnaire: questionnaire(),
            },
            at(0),
        );
        assert_eq!(s.plans.len(), 1);
        assert_eq!(s.plans[0].id.as_str(), "tier-1");
    }
}

