//! HTTP adapter for the auth backend.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::BackendClient;
use crate::domain::auth::Identity;
use crate::domain::foundation::UserId;
use crate::ports::{
    ApiError, AuthApi, AuthApiError, AuthSuccess, CodeVerification, SignUpRequest,
};

pub struct HttpAuthApi {
    client: Arc<BackendClient>,
}

impl HttpAuthApi {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone_number: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeBody<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyMfaBody<'a> {
    mfa_token: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    phone_number: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user: UserDto,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeResponse {
    existing_account: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<UserDto>,
}

/// Machine-readable error body returned by the auth endpoints.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    attempts_remaining: Option<u32>,
}

impl UserDto {
    fn into_identity(self) -> Result<Identity, AuthApiError> {
        let user_id = UserId::new(self.id)
            .map_err(|e| AuthApiError::Api(ApiError::decode(e.to_string())))?;
        Ok(Identity::new(
            user_id,
            self.first_name,
            self.last_name,
            self.email,
            self.phone_number.unwrap_or_default(),
        ))
    }
}

fn into_success(response: AuthResponse) -> Result<AuthSuccess, AuthApiError> {
    Ok(AuthSuccess {
        identity: response.user.into_identity()?,
        token: SecretString::new(response.token),
    })
}

/// Maps backend rejection bodies onto the specific auth error variants
/// the flow distinguishes. Anything unrecognized stays a transport
/// error and surfaces as the generic retryable message.
fn map_auth_error(error: ApiError) -> AuthApiError {
    let ApiError::Backend { status, ref message } = error else {
        return AuthApiError::Api(error);
    };
    let body: AuthErrorBody = serde_json::from_str(message).unwrap_or(AuthErrorBody {
        code: None,
        attempts_remaining: None,
    });
    match (status, body.code.as_deref()) {
        (_, Some("invalid_credentials")) | (401, None) => AuthApiError::InvalidCredentials,
        (_, Some("needs_activation")) => AuthApiError::NeedsActivation,
        (_, Some("invalid_code")) => AuthApiError::InvalidCode,
        (_, Some("code_expired")) => AuthApiError::CodeExpired,
        (_, Some("wrong_mfa_code")) => AuthApiError::WrongMfaCode {
            attempts_remaining: body.attempts_remaining,
        },
        (429, _) | (_, Some("rate_limited")) => AuthApiError::RateLimited,
        _ => AuthApiError::Api(error),
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthApiError> {
        let response: AuthResponse = self
            .client
            .post_json("auth/signin", &SignInBody { email, password })
            .await
            .map_err(map_auth_error)?;
        into_success(response)
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthSuccess, AuthApiError> {
        let response: AuthResponse = self
            .client
            .post_json(
                "auth/signup",
                &SignUpBody {
                    first_name: &request.first_name,
                    last_name: &request.last_name,
                    email: &request.email,
                    phone_number: &request.phone_number,
                },
            )
            .await
            .map_err(map_auth_error)?;
        into_success(response)
    }

    async fn send_verification_code(&self, email: &str) -> Result<(), AuthApiError> {
        self.client
            .post_unit("auth/send-verification-code", &EmailBody { email })
            .await
            .map_err(map_auth_error)
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<CodeVerification, AuthApiError> {
        let response: VerifyCodeResponse = self
            .client
            .post_json("auth/verify-code", &VerifyCodeBody { email, code })
            .await
            .map_err(map_auth_error)?;

        let auth = match (response.token, response.user) {
            (Some(token), Some(user)) => Some(AuthSuccess {
                identity: user.into_identity()?,
                token: SecretString::new(token),
            }),
            _ => None,
        };
        Ok(CodeVerification {
            existing_account: response.existing_account,
            auth,
        })
    }

    async fn verify_mfa(
        &self,
        mfa_token: &SecretString,
        code: &str,
    ) -> Result<AuthSuccess, AuthApiError> {
        let response: AuthResponse = self
            .client
            .post_json(
                "auth/verify-mfa",
                &VerifyMfaBody {
                    mfa_token: mfa_token.expose_secret(),
                    code,
                },
            )
            .await
            .map_err(map_auth_error)?;
        into_success(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_bodies_map_to_specific_variants() {
        let error = ApiError::backend(400, r#"{"code":"invalid_code"}"#);
        assert!(matches!(map_auth_error(error), AuthApiError::InvalidCode));

        let error = ApiError::backend(401, r#"{"code":"wrong_mfa_code","attemptsRemaining":2}"#);
        assert!(matches!(
            map_auth_error(error),
            AuthApiError::WrongMfaCode { attempts_remaining: Some(2) }
        ));
    }

    #[test]
    fn bare_401_means_invalid_credentials() {
        let error = ApiError::backend(401, "unauthorized");
        assert!(matches!(
            map_auth_error(error),
            AuthApiError::InvalidCredentials
        ));
    }

    #[test]
    fn unrecognized_failures_stay_transport_errors() {
        let error = ApiError::backend(503, "upstream down");
        assert!(matches!(map_auth_error(error), AuthApiError::Api(_)));

        let error = ApiError::network("connection refused");
        assert!(matches!(map_auth_error(error), AuthApiError::Api(_)));
    }
}
