//! Flow orchestrator: executes reducer effects against the ports.
//!
//! The orchestrator owns the [`FlowState`] behind a mutex. `dispatch`
//! reduces an event under the lock, releases it, then executes the
//! returned effects; awaited port results are fed back through the
//! reducer as new events. Scheduled effects (auto-advance, MFA exit)
//! run on detached tasks and re-dispatch when their delay elapses.
//!
//! Stale responses are discarded with the epoch: every modal close
//! bumps it, and any result captured under an older epoch is dropped
//! instead of reduced.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::domain::flow::{reduce, AuthPayload, Effect, FlowEvent, FlowState, ProductContext};
use crate::domain::foundation::TabSessionId;
use crate::domain::questionnaire::{Step, StepCategory};
use crate::ports::{
    AnalyticsSink, AuthApi, AuthApiError, Clock, PaymentApi, PaymentIntentRequest,
    QuestionnaireSource, SequenceTriggerApi, ShippingInfo, SignUpRequest,
};

/// All external collaborators the orchestrator drives.
pub struct FlowPorts {
    pub auth: Arc<dyn AuthApi>,
    pub payments: Arc<dyn PaymentApi>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub questionnaires: Arc<dyn QuestionnaireSource>,
    pub sequences: Arc<dyn SequenceTriggerApi>,
    pub clock: Arc<dyn Clock>,
}

/// Drives one widget instance: holds its state, runs its effects.
pub struct FlowOrchestrator {
    state: Mutex<FlowState>,
    ports: FlowPorts,
    auto_advance_delay: Duration,
    mfa_exit_delay: Duration,
    /// URL the host should replace the location with, set when an OAuth
    /// callback was stripped.
    replaced_url: Mutex<Option<String>>,
}

impl FlowOrchestrator {
    pub fn new(product: ProductContext, config: &AppConfig, ports: FlowPorts) -> Arc<Self> {
        let state = FlowState::new(
            product,
            TabSessionId::new(),
            config.analytics.dedup_window_secs,
        );
        Arc::new(Self {
            state: Mutex::new(state),
            ports,
            auto_advance_delay: config.flow.auto_advance_delay(),
            mfa_exit_delay: config.flow.mfa_exit_delay(),
            replaced_url: Mutex::new(None),
        })
    }

    /// Reduces one event and runs every effect it produces, including
    /// the events those effects feed back in.
    pub async fn dispatch(self: &Arc<Self>, event: FlowEvent) {
        self.apply(event, None).await;
    }

    /// Read access to the current flow state.
    pub async fn with_state<R>(&self, f: impl FnOnce(&FlowState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Takes the pending URL replacement, if an OAuth callback was
    /// processed since the last call.
    pub async fn take_replaced_url(&self) -> Option<String> {
        self.replaced_url.lock().await.take()
    }

    async fn apply(self: &Arc<Self>, event: FlowEvent, expected_epoch: Option<u64>) {
        let (mut queue, epoch) = {
            let mut state = self.state.lock().await;
            if let Some(expected) = expected_epoch {
                if state.epoch != expected {
                    tracing::debug!(expected, current = state.epoch, "discarding stale event");
                    return;
                }
            }
            let now = self.ports.clock.now();
            let effects = reduce(&mut state, event, now);
            (VecDeque::from(effects), state.epoch)
        };

        while let Some(effect) = queue.pop_front() {
            let Some(event) = self.execute(effect, epoch).await else {
                continue;
            };
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                tracing::debug!("session ended mid-effect; dropping result");
                return;
            }
            let now = self.ports.clock.now();
            queue.extend(reduce(&mut state, event, now));
        }
    }

    /// Runs one effect. Returns the event its result reduces to, if
    /// any; scheduled and fire-and-forget effects return nothing here.
    async fn execute(self: &Arc<Self>, effect: Effect, epoch: u64) -> Option<FlowEvent> {
        match effect {
            Effect::LoadQuestionnaire => Some(self.load_questionnaire().await),
            Effect::ReplaceUrl(url) => {
                *self.replaced_url.lock().await = Some(url);
                None
            }

            Effect::ScheduleAutoAdvance { from_index } => {
                self.spawn_delayed(
                    self.auto_advance_delay,
                    FlowEvent::AutoAdvanceElapsed { from_index },
                    epoch,
                );
                None
            }
            Effect::ScheduleMfaExit => {
                self.spawn_delayed(self.mfa_exit_delay, FlowEvent::MfaExitElapsed, epoch);
                None
            }

            Effect::SignIn { email, password } => {
                use secrecy::ExposeSecret;
                let result = self.ports.auth.sign_in(&email, password.expose_secret()).await;
                Some(auth_result_event(result))
            }
            Effect::SignUp(fields) => {
                let request = SignUpRequest {
                    first_name: fields.first_name,
                    last_name: fields.last_name,
                    email: fields.email,
                    phone_number: fields.phone_number,
                };
                Some(auth_result_event(self.ports.auth.sign_up(request).await))
            }
            Effect::SendVerificationCode { email } => {
                match self.ports.auth.send_verification_code(&email).await {
                    Ok(()) => None,
                    Err(error) => Some(FlowEvent::SignInFailed {
                        message: error.user_message(),
                    }),
                }
            }
            Effect::VerifyCode { email, code } => {
                match self.ports.auth.verify_code(&email, &code).await {
                    Ok(verification) => Some(FlowEvent::EmailCodeVerified {
                        auth: verification.auth.map(|success| AuthPayload {
                            identity: success.identity,
                            token: success.token,
                        }),
                    }),
                    Err(error) => Some(FlowEvent::EmailCodeRejected {
                        message: error.user_message(),
                    }),
                }
            }
            Effect::VerifyMfa { mfa_token, code } => {
                match self.ports.auth.verify_mfa(&mfa_token, &code).await {
                    Ok(success) => Some(FlowEvent::SignInSucceeded(AuthPayload {
                        identity: success.identity,
                        token: success.token,
                    })),
                    Err(error) => Some(FlowEvent::MfaFailed {
                        failure: mfa_failure(error),
                    }),
                }
            }

            Effect::CreatePaymentIntent { plan_id, stripe_price_id } => {
                let request = {
                    let state = self.state.lock().await;
                    PaymentIntentRequest {
                        plan_id,
                        stripe_price_id,
                        answers: state.answers.snapshot(),
                        shipping: ShippingInfo::from_answers(&state.answers),
                        clinic_merchant_of_record: state.product.clinic_merchant_of_record,
                    }
                };
                match self.ports.payments.create_subscription_intent(request).await {
                    Ok(intent) => Some(FlowEvent::PaymentIntentReady { intent }),
                    Err(error) => {
                        tracing::warn!(%error, "payment intent creation failed");
                        Some(FlowEvent::PaymentIntentFailed {
                            message: "We couldn't set up your payment. Please try again."
                                .to_string(),
                        })
                    }
                }
            }
            Effect::TriggerCheckoutSequence { user_id, order_id } => {
                if let Err(error) = self
                    .ports
                    .sequences
                    .checkout_completed(&user_id, order_id.as_ref())
                    .await
                {
                    // best-effort: checkout already succeeded
                    tracing::warn!(%error, "checkout sequence trigger failed");
                }
                None
            }

            Effect::Track(event) => {
                if let Err(error) = self.ports.analytics.track(&event).await {
                    tracing::warn!(%error, "analytics delivery failed");
                }
                None
            }
            Effect::Beacon(event) => {
                self.ports.analytics.beacon(event);
                None
            }
        }
    }

    async fn load_questionnaire(self: &Arc<Self>) -> FlowEvent {
        let (product_id, form_override) = {
            let state = self.state.lock().await;
            (state.product.product_id.clone(), state.product.form_id.clone())
        };

        let loaded = match form_override {
            Some(form_id) => self
                .ports
                .questionnaires
                .by_id(&form_id)
                .await
                .map(|q| (form_id, q)),
            None => self.ports.questionnaires.by_treatment(&product_id).await,
        };

        match loaded {
            Ok((form_id, mut questionnaire)) => {
                // questionnaires without an identity step get the shared
                // one appended, so every visitor can create an account
                let has_profile = questionnaire.steps.iter().any(|s| s.is_user_profile());
                if !has_profile {
                    if let Some(step) = self.identity_step().await {
                        questionnaire.steps.push(step);
                    }
                }
                FlowEvent::QuestionnaireLoaded { form_id, questionnaire }
            }
            Err(error) => {
                tracing::error!(%error, "questionnaire load failed");
                FlowEvent::QuestionnaireLoadFailed {
                    message: "We couldn't load this questionnaire. Please try again.".to_string(),
                }
            }
        }
    }

    /// The shared identity-creation step: the dedicated endpoint first,
    /// then the standardized catalogue when it has nothing.
    async fn identity_step(&self) -> Option<Step> {
        match self.ports.questionnaires.first_user_profile().await {
            Ok(Some(step)) => return Some(step),
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "first-user-profile lookup failed"),
        }
        match self.ports.questionnaires.standardized(StepCategory::UserProfile).await {
            Ok(steps) => steps.into_iter().next(),
            Err(error) => {
                tracing::warn!(%error, "standardized identity step unavailable");
                None
            }
        }
    }

    fn spawn_delayed(self: &Arc<Self>, delay: Duration, event: FlowEvent, epoch: u64) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.apply_boxed(event, epoch).await;
        });
    }

    /// Boxed re-entry point for delayed tasks; boxing breaks the
    /// otherwise-recursive future type.
    fn apply_boxed(self: Arc<Self>, event: FlowEvent, epoch: u64) -> BoxFuture<'static, ()> {
        Box::pin(async move { self.apply(event, Some(epoch)).await })
    }
}

fn auth_result_event(result: Result<crate::ports::AuthSuccess, AuthApiError>) -> FlowEvent {
    match result {
        Ok(success) => FlowEvent::SignInSucceeded(AuthPayload {
            identity: success.identity,
            token: success.token,
        }),
        Err(error) => FlowEvent::SignInFailed {
            message: error.user_message(),
        },
    }
}

/// Maps backend MFA rejections onto challenge failure modes. Transport
/// errors keep the challenge alive like a wrong code, with no attempt
/// count.
fn mfa_failure(error: AuthApiError) -> crate::domain::auth::MfaVerifyFailure {
    use crate::domain::auth::MfaVerifyFailure;
    match error {
        AuthApiError::CodeExpired => MfaVerifyFailure::Expired,
        AuthApiError::RateLimited => MfaVerifyFailure::RateLimited,
        AuthApiError::WrongMfaCode { attempts_remaining } => {
            MfaVerifyFailure::WrongCode { attempts_remaining }
        }
        other => {
            tracing::warn!(%other, "MFA verification failed outside the known modes");
            MfaVerifyFailure::WrongCode { attempts_remaining: None }
        }
    }
}
