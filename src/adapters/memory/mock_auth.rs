//! Mock auth backend for testing.
//!
//! Scripted per method: queued results are consumed in order, and every
//! call is recorded for verification. An unscripted call fails with a
//! network error rather than panicking, so a missing script shows up as
//! a test assertion failure instead of a crash.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::auth::Identity;
use crate::domain::foundation::UserId;
use crate::ports::{
    ApiError, AuthApi, AuthApiError, AuthSuccess, CodeVerification, SignUpRequest,
};

/// Record of one call made against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    SignIn { email: String },
    SignUp { email: String },
    SendCode { email: String },
    VerifyCode { email: String, code: String },
    VerifyMfa { code: String },
}

#[derive(Default)]
struct Scripts {
    sign_in: VecDeque<Result<AuthSuccess, AuthApiError>>,
    sign_up: VecDeque<Result<AuthSuccess, AuthApiError>>,
    send_code: VecDeque<Result<(), AuthApiError>>,
    verify_code: VecDeque<Result<CodeVerification, AuthApiError>>,
    verify_mfa: VecDeque<Result<AuthSuccess, AuthApiError>>,
}

/// Configurable mock implementation of [`AuthApi`].
#[derive(Clone, Default)]
pub struct MockAuthApi {
    scripts: Arc<Mutex<Scripts>>,
    calls: Arc<Mutex<Vec<AuthCall>>>,
}

/// A ready-made successful authentication for scripting.
pub fn auth_success(user_id: &str, email: &str) -> AuthSuccess {
    AuthSuccess {
        identity: Identity::new(
            UserId::new(user_id).expect("non-empty test id"),
            "Test",
            "User",
            email,
            "555-0100",
        ),
        token: SecretString::new(format!("token-{user_id}")),
    }
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_sign_in(&self, result: Result<AuthSuccess, AuthApiError>) -> &Self {
        self.scripts.lock().unwrap().sign_in.push_back(result);
        self
    }

    pub fn script_sign_up(&self, result: Result<AuthSuccess, AuthApiError>) -> &Self {
        self.scripts.lock().unwrap().sign_up.push_back(result);
        self
    }

    pub fn script_send_code(&self, result: Result<(), AuthApiError>) -> &Self {
        self.scripts.lock().unwrap().send_code.push_back(result);
        self
    }

    pub fn script_verify_code(&self, result: Result<CodeVerification, AuthApiError>) -> &Self {
        self.scripts.lock().unwrap().verify_code.push_back(result);
        self
    }

    pub fn script_verify_mfa(&self, result: Result<AuthSuccess, AuthApiError>) -> &Self {
        self.scripts.lock().unwrap().verify_mfa.push_back(result);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: AuthCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn unscripted() -> AuthApiError {
        AuthApiError::Api(ApiError::network("no scripted response"))
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSuccess, AuthApiError> {
        self.record(AuthCall::SignIn { email: email.to_string() });
        let next = self.scripts.lock().unwrap().sign_in.pop_front();
        next.unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthSuccess, AuthApiError> {
        self.record(AuthCall::SignUp { email: request.email.clone() });
        let next = self.scripts.lock().unwrap().sign_up.pop_front();
        next.unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn send_verification_code(&self, email: &str) -> Result<(), AuthApiError> {
        self.record(AuthCall::SendCode { email: email.to_string() });
        let next = self.scripts.lock().unwrap().send_code.pop_front();
        next.unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<CodeVerification, AuthApiError> {
        self.record(AuthCall::VerifyCode {
            email: email.to_string(),
            code: code.to_string(),
        });
        let next = self.scripts.lock().unwrap().verify_code.pop_front();
        next.unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn verify_mfa(
        &self,
        _mfa_token: &SecretString,
        code: &str,
    ) -> Result<AuthSuccess, AuthApiError> {
        self.record(AuthCall::VerifyMfa { code: code.to_string() });
        let next = self.scripts.lock().unwrap().verify_mfa.pop_front();
        next.unwrap_or_else(|| Err(Self::unscripted()))
    }
}

pub fn code_verification_existing(user_id: &str, email: &str) -> CodeVerification {
    CodeVerification {
        existing_account: true,
        auth: Some(auth_success(user_id, email)),
    }
}

pub fn code_verification_new() -> CodeVerification {
    CodeVerification {
        existing_account: false,
        auth: None,
    }
}
