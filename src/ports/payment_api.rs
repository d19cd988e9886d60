//! Payment backend port.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

use super::ApiError;
use crate::domain::answers::{shipping_keys, AnswerStore, AnswerValue};
use crate::domain::foundation::PlanId;
use crate::domain::payment::PaymentIntent;

/// Shipping details collected on the checkout step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl ShippingInfo {
    /// Extracts shipping fields from the answer store; missing fields
    /// come through empty (the checkout validator rejects them before
    /// an intent is ever requested with blanks).
    pub fn from_answers(answers: &AnswerStore) -> Self {
        let field = |key: &str| answers.get_text(key).unwrap_or_default();
        Self {
            address: field(shipping_keys::ADDRESS),
            city: field(shipping_keys::CITY),
            state: field(shipping_keys::STATE),
            zip_code: field(shipping_keys::ZIP_CODE),
        }
    }
}

/// Payload for `POST /payments/product/sub`.
///
/// Carries the full structured answer set so the backend can attach the
/// questionnaire responses to the order.
#[derive(Debug, Clone)]
pub struct PaymentIntentRequest {
    pub plan_id: PlanId,
    /// Server mints a price lazily when absent.
    pub stripe_price_id: Option<String>,
    pub answers: HashMap<String, AnswerValue>,
    pub shipping: ShippingInfo,
    /// Bill through the clinic as merchant of record when applicable.
    pub clinic_merchant_of_record: bool,
}

/// Port for subscription/payment-intent creation.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// `POST /payments/product/sub` - create a payment/subscription
    /// intent for the chosen plan.
    async fn create_subscription_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_info_reads_the_synthetic_keys() {
        let mut answers = AnswerStore::new();
        answers.set(shipping_keys::ADDRESS, AnswerValue::from("1 Main St"));
        answers.set(shipping_keys::CITY, AnswerValue::from("Springfield"));
        answers.set(shipping_keys::STATE, AnswerValue::from("IL"));
        answers.set(shipping_keys::ZIP_CODE, AnswerValue::from("62704"));

        let shipping = ShippingInfo::from_answers(&answers);
        assert_eq!(shipping.address, "1 Main St");
        assert_eq!(shipping.zip_code, "62704");
    }

    #[test]
    fn missing_shipping_fields_come_through_empty() {
        let shipping = ShippingInfo::from_answers(&AnswerStore::new());
        assert!(shipping.address.is_empty());
    }
}
