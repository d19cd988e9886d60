//! Post-checkout sequence trigger port.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::foundation::{OrderId, UserId};

/// Port for kicking off backend follow-up sequences after checkout.
///
/// Delivery is best-effort: a failure here never blocks or rewinds the
/// completed payment, callers log and move on.
#[async_trait]
pub trait SequenceTriggerApi: Send + Sync {
    /// `POST /sequence-triggers/checkout`.
    async fn checkout_completed(
        &self,
        user_id: &UserId,
        order_id: Option<&OrderId>,
    ) -> Result<(), ApiError>;
}
