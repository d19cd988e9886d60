//! Authentication sub-state-machines.
//!
//! Four independent entry sub-flows (password sign-in, Google OAuth
//! redirect capture, email one-time-code, Google MFA challenge) all
//! converge on setting [`Identity`] exactly once. Once any sub-flow
//! completes, the others are dismissed and `user_profile` steps are
//! suppressed from the next sequencer operation onward.

mod email_code;
mod identity;
mod mfa;
mod oauth;

pub use email_code::{EmailCodeFlow, EmailCodePhase, VerifyCodeOutcome};
pub use identity::Identity;
pub use mfa::{MfaChallenge, MfaStatus, MfaVerifyFailure};
pub use oauth::{parse_oauth_callback, OauthCallback, OauthOutcome, OauthUser};

use secrecy::SecretString;

/// The currently active authentication sub-flow UI, if any.
///
/// Sub-flows are mutually exclusive; entering one replaces another.
#[derive(Debug)]
pub enum ActiveAuthFlow {
    /// Email + password form.
    Password,
    /// Email one-time-code entry.
    EmailCode(EmailCodeFlow),
    /// Six-digit Google MFA challenge.
    Mfa(MfaChallenge),
}

/// Converged authentication state for one modal session.
#[derive(Debug, Default)]
pub struct AuthState {
    identity: Option<Identity>,
    access_token: Option<SecretString>,
    /// Sub-flow currently presented to the visitor.
    pub active_flow: Option<ActiveAuthFlow>,
    /// Human-readable error from the last failed attempt.
    pub error_message: Option<String>,
    /// Email confirmed via one-time code for a brand new account; the
    /// visitor continues filling the identity step manually.
    pub confirmed_email: Option<String>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once any sub-flow has completed.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    /// Sets the identity exactly once; later completions are no-ops.
    ///
    /// Dismisses whatever sub-flow UI is still active. Returns true if
    /// this call actually set the identity.
    pub fn set_identity(&mut self, identity: Identity, token: Option<SecretString>) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.identity = Some(identity);
        self.access_token = token;
        self.active_flow = None;
        self.error_message = None;
        true
    }

    /// Clears everything. Used when the modal closes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn identity(user: &str, email: &str) -> Identity {
        Identity::new(
            UserId::new(user).unwrap(),
            "Ada",
            "Lovelace",
            email,
            "555-0100",
        )
    }

    #[test]
    fn identity_is_set_exactly_once() {
        let mut state = AuthState::new();

        assert!(state.set_identity(identity("u1", "first@example.com"), None));
        assert!(!state.set_identity(identity("u2", "second@example.com"), None));

        assert_eq!(state.identity().unwrap().email, "first@example.com");
    }

    #[test]
    fn completing_auth_dismisses_active_sub_flow() {
        let mut state = AuthState::new();
        state.active_flow = Some(ActiveAuthFlow::Password);
        state.error_message = Some("Invalid credentials".into());

        state.set_identity(identity("u1", "a@b.com"), None);

        assert!(state.active_flow.is_none());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn reset_returns_to_anonymous() {
        let mut state = AuthState::new();
        state.set_identity(identity("u1", "a@b.com"), None);

        state.reset();

        assert!(!state.is_authenticated());
    }
}
