//! HTTP adapter for post-checkout sequence triggers.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::client::BackendClient;
use crate::domain::foundation::{OrderId, UserId};
use crate::ports::{ApiError, SequenceTriggerApi};

pub struct HttpSequenceTriggerApi {
    client: Arc<BackendClient>,
}

impl HttpSequenceTriggerApi {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerBody<'a> {
    user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<&'a str>,
}

#[async_trait]
impl SequenceTriggerApi for HttpSequenceTriggerApi {
    async fn checkout_completed(
        &self,
        user_id: &UserId,
        order_id: Option<&OrderId>,
    ) -> Result<(), ApiError> {
        self.client
            .post_unit(
                "sequence-triggers/checkout",
                &TriggerBody {
                    user_id: user_id.as_str(),
                    order_id: order_id.map(OrderId::as_str),
                },
            )
            .await
    }
}
