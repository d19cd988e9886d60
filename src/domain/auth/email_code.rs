//! Email one-time-code sub-flow.
//!
//! Two steps: request a code to an email address, then verify the
//! submitted code. Verification branches on whether the backend reports
//! an existing account: an existing account authenticates immediately,
//! a new account only confirms the email and the visitor keeps filling
//! the identity step manually.

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle of a single email-code challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailCodePhase {
    /// Code requested and (best case) delivered; waiting for input.
    CodeSent,
    /// A verify call is in flight; inputs are disabled.
    Verifying,
    /// The code was accepted.
    Verified,
}

impl StateMachine for EmailCodePhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EmailCodePhase::*;
        matches!(
            (self, target),
            (CodeSent, Verifying)
                | (Verifying, Verified)
                // wrong code: back to input for another attempt
                | (Verifying, CodeSent)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EmailCodePhase::*;
        match self {
            CodeSent => vec![Verifying],
            Verifying => vec![Verified, CodeSent],
            Verified => vec![],
        }
    }
}

/// What the backend reported for a verified code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyCodeOutcome {
    /// The email belongs to an existing account; the visitor is now
    /// authenticated and the sequencer advances past identity steps.
    ExistingAccount,
    /// New visitor; only the email is confirmed.
    NewAccount,
}

/// State of the email one-time-code sub-flow.
#[derive(Debug, Clone)]
pub struct EmailCodeFlow {
    email: String,
    phase: EmailCodePhase,
}

impl EmailCodeFlow {
    /// Starts the flow by validating the address a code was requested
    /// for. The address must contain `@` before any network call.
    pub fn request(email: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        Ok(Self {
            email,
            phase: EmailCodePhase::CodeSent,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phase(&self) -> EmailCodePhase {
        self.phase
    }

    /// Marks a verify call as in flight.
    pub fn begin_verify(&mut self) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(EmailCodePhase::Verifying)?;
        Ok(())
    }

    /// Records an accepted code.
    pub fn complete(&mut self) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(EmailCodePhase::Verified)?;
        Ok(())
    }

    /// Returns to input after a rejected code.
    pub fn retry(&mut self) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(EmailCodePhase::CodeSent)?;
        Ok(())
    }
}
