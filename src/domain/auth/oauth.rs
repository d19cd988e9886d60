//! Google OAuth redirect capture.
//!
//! After the OAuth round-trip the hosting page URL carries query
//! parameters signaling the result. This module parses them into an
//! [`OauthOutcome`] and produces the same URL with the OAuth parameters
//! stripped, so the host can replace the location without a page
//! reload. The caller guards against re-processing via the
//! `oauth_handled` flag on the flow state; parsing itself is pure.

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use super::Identity;
use crate::domain::foundation::UserId;

/// Query parameters consumed (and stripped) from the callback URL.
const OAUTH_PARAMS: [&str; 5] = ["googleAuth", "token", "user", "mfaToken", "email"];

/// User payload carried URL-encoded in the `user` query parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Result of parsing the OAuth completion signal.
#[derive(Debug)]
pub enum OauthOutcome {
    /// Token and user present: the visitor is authenticated.
    Success {
        identity: Identity,
        token: SecretString,
    },
    /// The account requires a second factor.
    MfaRequired {
        mfa_token: SecretString,
        masked_email: String,
    },
    /// The provider reported a failure, or the signal was incomplete.
    Error { message: String },
}

/// A parsed callback plus the URL with OAuth parameters removed.
#[derive(Debug)]
pub struct OauthCallback {
    pub outcome: OauthOutcome,
    /// Same URL, OAuth query parameters stripped, other parameters kept.
    pub stripped_url: String,
}

/// Parses the current page URL for an OAuth completion signal.
///
/// Returns `None` when the URL carries no `googleAuth` parameter (the
/// common case on a fresh mount) or cannot be parsed as a URL at all.
pub fn parse_oauth_callback(page_url: &str) -> Option<OauthCallback> {
    let url = Url::parse(page_url).ok()?;

    let mut status = None;
    let mut token = None;
    let mut user_json = None;
    let mut mfa_token = None;
    let mut email = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "googleAuth" => status = Some(value.into_owned()),
            "token" => token = Some(value.into_owned()),
            "user" => user_json = Some(value.into_owned()),
            "mfaToken" => mfa_token = Some(value.into_owned()),
            "email" => email = Some(value.into_owned()),
            _ => {}
        }
    }

    let status = status?;
    let stripped_url = strip_oauth_params(&url);

    let outcome = match status.as_str() {
        "success" => match (token, user_json) {
            (Some(token), Some(user_json)) => match decode_user(&user_json) {
                Ok(identity) => OauthOutcome::Success {
                    identity,
                    token: SecretString::new(token),
                },
                Err(reason) => {
                    tracing::warn!(%reason, "OAuth success signal carried an unreadable user payload");
                    generic_failure()
                }
            },
            _ => {
                tracing::warn!("OAuth success signal missing token or user");
                generic_failure()
            }
        },
        "mfa_required" => match mfa_token {
            Some(mfa_token) => OauthOutcome::MfaRequired {
                mfa_token: SecretString::new(mfa_token),
                masked_email: email.unwrap_or_default(),
            },
            None => {
                tracing::warn!("OAuth mfa_required signal missing mfaToken");
                generic_failure()
            }
        },
        _ => generic_failure(),
    };

    Some(OauthCallback { outcome, stripped_url })
}

fn generic_failure() -> OauthOutcome {
    OauthOutcome::Error {
        message: "Google sign-in failed. Please try again.".to_string(),
    }
}

fn decode_user(user_json: &str) -> Result<Identity, String> {
    let user: OauthUser = serde_json::from_str(user_json).map_err(|e| e.to_string())?;
    let user_id = UserId::new(user.id).map_err(|e| e.to_string())?;
    Ok(Identity::new(
        user_id,
        user.first_name,
        user.last_name,
        user.email,
        user.phone_number.unwrap_or_default(),
    ))
}

fn strip_oauth_params(url: &Url) -> String {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !OAUTH_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped
            .query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    stripped.to_string()
}
