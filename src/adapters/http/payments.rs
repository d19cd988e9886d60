//! HTTP adapter for the payment backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::client::BackendClient;
use crate::domain::answers::AnswerValue;
use crate::domain::foundation::{OrderId, PaymentIntentId};
use crate::domain::payment::PaymentIntent;
use crate::ports::{ApiError, PaymentApi, PaymentIntentRequest, ShippingInfo};

pub struct HttpPaymentApi {
    client: Arc<BackendClient>,
}

impl HttpPaymentApi {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntentBody<'a> {
    plan_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stripe_price_id: Option<&'a str>,
    answers: &'a HashMap<String, AnswerValue>,
    shipping: &'a ShippingInfo,
    clinic_merchant_of_record: bool,
}

/// One-off payments answer with `paymentIntentId`; subscription plans
/// answer with `subscriptionId`. Both name the same intent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentResponse {
    client_secret: String,
    #[serde(alias = "subscriptionId")]
    payment_intent_id: String,
    #[serde(default)]
    order_id: Option<String>,
}

#[async_trait]
impl PaymentApi for HttpPaymentApi {
    async fn create_subscription_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, ApiError> {
        let body = IntentBody {
            plan_id: request.plan_id.as_str(),
            stripe_price_id: request.stripe_price_id.as_deref(),
            answers: &request.answers,
            shipping: &request.shipping,
            clinic_merchant_of_record: request.clinic_merchant_of_record,
        };
        let response: IntentResponse = self
            .client
            .post_json("payments/product/sub", &body)
            .await?;

        let payment_intent_id = PaymentIntentId::new(response.payment_intent_id)
            .map_err(|e| ApiError::decode(e.to_string()))?;
        let order_id = match response.order_id {
            Some(id) => Some(OrderId::new(id).map_err(|e| ApiError::decode(e.to_string()))?),
            None => None,
        };
        Ok(PaymentIntent {
            client_secret: response.client_secret,
            payment_intent_id,
            order_id,
        })
    }
}
