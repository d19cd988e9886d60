//! Google MFA challenge: six single-character code fields.
//!
//! The code is entered as six independent fields with
//! auto-advance-on-input, backspace-to-previous-field navigation, and
//! paste-to-fill-all. Failure modes differ: expired and rate-limited
//! codes are terminal for the challenge (the visitor is forced out of
//! MFA mode after a brief display delay), while a wrong code keeps the
//! challenge alive, clears the inputs, and refocuses the first field.

use secrecy::SecretString;

use crate::domain::foundation::StateMachine;

/// Number of code fields.
pub const MFA_CODE_LEN: usize = 6;

/// Lifecycle of the MFA challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaStatus {
    /// Accepting digit input.
    Entering,
    /// Verify call in flight; inputs disabled.
    Verifying,
    /// Code expired; cannot be retried within this session.
    Expired,
    /// Too many attempts; cannot be retried within this session.
    RateLimited,
}

impl StateMachine for MfaStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MfaStatus::*;
        matches!(
            (self, target),
            (Entering, Verifying)
                | (Verifying, Entering)
                | (Verifying, Expired)
                | (Verifying, RateLimited)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MfaStatus::*;
        match self {
            Entering => vec![Verifying],
            Verifying => vec![Entering, Expired, RateLimited],
            Expired | RateLimited => vec![],
        }
    }
}

/// How the server rejected a submitted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfaVerifyFailure {
    /// The code did not match; the visitor may try again.
    WrongCode { attempts_remaining: Option<u32> },
    /// The code expired.
    Expired,
    /// Too many attempts.
    RateLimited,
}

/// State of an in-progress MFA challenge.
#[derive(Debug)]
pub struct MfaChallenge {
    mfa_token: SecretString,
    masked_email: String,
    digits: [Option<char>; MFA_CODE_LEN],
    focus: usize,
    status: MfaStatus,
    error_message: Option<String>,
}

impl MfaChallenge {
    pub fn new(mfa_token: SecretString, masked_email: impl Into<String>) -> Self {
        Self {
            mfa_token,
            masked_email: masked_email.into(),
            digits: [None; MFA_CODE_LEN],
            focus: 0,
            status: MfaStatus::Entering,
            error_message: None,
        }
    }

    pub fn mfa_token(&self) -> &SecretString {
        &self.mfa_token
    }

    pub fn masked_email(&self) -> &str {
        &self.masked_email
    }

    pub fn status(&self) -> MfaStatus {
        self.status
    }

    /// Index of the field that currently has focus.
    pub fn focused_field(&self) -> usize {
        self.focus
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The digit shown in a field.
    pub fn digit_at(&self, index: usize) -> Option<char> {
        self.digits.get(index).copied().flatten()
    }

    /// Types one character into the focused field; non-digits are
    /// ignored. Focus auto-advances to the next field.
    pub fn input_digit(&mut self, ch: char) {
        if self.status != MfaStatus::Entering || !ch.is_ascii_digit() {
            return;
        }
        self.digits[self.focus] = Some(ch);
        if self.focus < MFA_CODE_LEN - 1 {
            self.focus += 1;
        }
    }

    /// Backspace: clears the focused field if filled, otherwise moves
    /// to the previous field and clears that one.
    pub fn backspace(&mut self) {
        if self.status != MfaStatus::Entering {
            return;
        }
        if self.digits[self.focus].is_some() {
            self.digits[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
            self.digits[self.focus] = None;
        }
    }

    /// Paste-to-fill: takes the first six digits of the pasted text and
    /// fills the fields from the start.
    pub fn paste(&mut self, text: &str) {
        if self.status != MfaStatus::Entering {
            return;
        }
        let digits: Vec<char> = text.chars().filter(char::is_ascii_digit).take(MFA_CODE_LEN).collect();
        if digits.is_empty() {
            return;
        }
        self.digits = [None; MFA_CODE_LEN];
        for (i, ch) in digits.iter().enumerate() {
            self.digits[i] = Some(*ch);
        }
        self.focus = (digits.len()).min(MFA_CODE_LEN - 1);
    }

    /// The full six-digit code, if every field is filled.
    pub fn code(&self) -> Option<String> {
        if self.digits.iter().all(Option::is_some) {
            Some(self.digits.iter().flatten().collect())
        } else {
            None
        }
    }

    /// Marks a verify call as in flight. Returns false if the challenge
    /// is not accepting input or the code is incomplete.
    pub fn begin_verify(&mut self) -> bool {
        if self.code().is_none() {
            return false;
        }
        match self.status.transition_to(MfaStatus::Verifying) {
            Ok(status) => {
                self.status = status;
                self.error_message = None;
                true
            }
            Err(_) => false,
        }
    }

    /// Applies a server rejection.
    ///
    /// Wrong codes clear the inputs, refocus field 0, and surface the
    /// remaining-attempts count when the server provides one. Expired
    /// and rate-limited codes move to their terminal status; the caller
    /// is expected to exit MFA mode after a brief display delay.
    pub fn apply_failure(&mut self, failure: MfaVerifyFailure) {
        match failure {
            MfaVerifyFailure::WrongCode { attempts_remaining } => {
                if let Ok(status) = self.status.transition_to(MfaStatus::Entering) {
                    self.status = status;
                }
                self.digits = [None; MFA_CODE_LEN];
                self.focus = 0;
                self.error_message = Some(match attempts_remaining {
                    Some(n) => format!("Incorrect code. {} attempts remaining.", n),
                    None => "Incorrect code. Please try again.".to_string(),
                });
            }
            MfaVerifyFailure::Expired => {
                if let Ok(status) = self.status.transition_to(MfaStatus::Expired) {
                    self.status = status;
                }
                self.error_message =
                    Some("This code has expired. Please sign in again.".to_string());
            }
            MfaVerifyFailure::RateLimited => {
                if let Ok(status) = self.status.transition_to(MfaStatus::RateLimited) {
                    self.status = status;
                }
                self.error_message =
                    Some("Too many attempts. Please try again later.".to_string());
            }
        }
    }
}
