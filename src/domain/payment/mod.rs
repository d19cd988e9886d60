//! Plan and payment state.
//!
//! Tracks the chosen plan and the payment lifecycle from plan selection
//! through intent creation to client-side confirmation. Only forward
//! transitions are possible, except retry after failure by re-selecting
//! a plan.

mod plan;
mod status;

pub use plan::{resolve_plans, BillingInterval, PlanOption};
pub use status::PaymentStatus;

use crate::domain::foundation::{OrderId, PaymentIntentId, PlanId, StateMachine, ValidationError};

/// Payment/subscription intent returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: PaymentIntentId,
    pub order_id: Option<OrderId>,
}

/// Mutable payment state for one modal session.
#[derive(Debug, Default)]
pub struct PaymentState {
    status: PaymentStatus,
    selected_plan: Option<PlanId>,
    intent: Option<PaymentIntent>,
    failure_reason: Option<String>,
}

impl PaymentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn selected_plan(&self) -> Option<&PlanId> {
        self.selected_plan.as_ref()
    }

    pub fn intent(&self) -> Option<&PaymentIntent> {
        self.intent.as_ref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Records a plan choice and clears any previous intent.
    ///
    /// Valid from `Idle` and, as the explicit retry path, from `Failed`.
    /// The caller then requests a fresh intent for the chosen plan.
    pub fn select_plan(&mut self, plan_id: PlanId) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(PaymentStatus::Processing)?;
        self.selected_plan = Some(plan_id);
        self.intent = None;
        self.failure_reason = None;
        Ok(())
    }

    /// Stores the intent created for the selected plan.
    pub fn intent_ready(&mut self, intent: PaymentIntent) {
        if self.status == PaymentStatus::Processing {
            self.intent = Some(intent);
        }
    }

    /// Client-side payment confirmed.
    pub fn confirm(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(PaymentStatus::Succeeded)?;
        Ok(())
    }

    /// Intent creation or client-side confirmation failed.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(PaymentStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    /// Clears all payment state. Used when the modal closes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
