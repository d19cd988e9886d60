//! Auth backend port.
//!
//! One port covers all four auth sub-flows: password sign-in, account
//! signup from the identity step, email one-time codes, and the Google
//! MFA challenge. (The OAuth redirect itself never reaches this port;
//! its result arrives encoded in the page URL.)
//!
//! # Contract
//!
//! Implementations must map backend failure responses to the specific
//! [`AuthApiError`] variants; the flow distinguishes them to decide
//! between retry-in-place and forced exit of a challenge.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use super::ApiError;
use crate::domain::auth::Identity;

/// A completed authentication: the mapped identity plus bearer token.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub identity: Identity,
    pub token: SecretString,
}

/// Result of verifying an email one-time code.
#[derive(Debug, Clone)]
pub struct CodeVerification {
    /// Whether the backend found an existing account for the email.
    pub existing_account: bool,
    /// Present only for existing accounts.
    pub auth: Option<AuthSuccess>,
}

/// Payload for creating an account from the identity step.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

/// Authentication failures, each with a distinct user-facing message.
#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Your account needs activation. Please check your email.")]
    NeedsActivation,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code expired")]
    CodeExpired,

    #[error("Too many attempts")]
    RateLimited,

    /// MFA code mismatch; the server may report how many attempts remain.
    #[error("Incorrect code")]
    WrongMfaCode { attempts_remaining: Option<u32> },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthApiError {
    /// Human-readable message surfaced inline in the auth UI.
    pub fn user_message(&self) -> String {
        match self {
            AuthApiError::Api(_) => {
                "Something went wrong. Please check your connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Port for the auth backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/signin` - email+password sign-in.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthApiError>;

    /// `POST /auth/signup` - create an account from the identity step.
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthSuccess, AuthApiError>;

    /// `POST /auth/send-verification-code` - email a one-time code.
    async fn send_verification_code(&self, email: &str) -> Result<(), AuthApiError>;

    /// `POST /auth/verify-code` - verify a one-time code.
    async fn verify_code(&self, email: &str, code: &str) -> Result<CodeVerification, AuthApiError>;

    /// MFA verify endpoint - resolve a Google MFA challenge.
    async fn verify_mfa(
        &self,
        mfa_token: &SecretString,
        code: &str,
    ) -> Result<AuthSuccess, AuthApiError>;
}
