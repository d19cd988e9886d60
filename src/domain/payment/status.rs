//! Payment status state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle of the checkout payment.
///
/// Transitions only move forward, except `Failed → Processing` which is
/// allowed on explicit retry (re-selecting a plan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Idle,
    Processing,
    Succeeded,
    Failed,
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Idle, Processing)
                | (Processing, Succeeded)
                | (Processing, Failed)
                | (Failed, Processing)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Idle => vec![Processing],
            Processing => vec![Succeeded, Failed],
            Failed => vec![Processing],
            Succeeded => vec![],
        }
    }
}
