//! Stub payment backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::PaymentIntentId;
use crate::domain::payment::PaymentIntent;
use crate::ports::{ApiError, PaymentApi, PaymentIntentRequest};

/// Scripted [`PaymentApi`] that records every intent request.
#[derive(Clone, Default)]
pub struct StubPaymentApi {
    results: Arc<Mutex<VecDeque<Result<PaymentIntent, ApiError>>>>,
    requests: Arc<Mutex<Vec<PaymentIntentRequest>>>,
}

/// A plausible intent for scripting.
pub fn test_intent(id: &str) -> PaymentIntent {
    PaymentIntent {
        client_secret: format!("cs_{id}"),
        payment_intent_id: PaymentIntentId::new(format!("pi_{id}")).expect("non-empty test id"),
        order_id: None,
    }
}

impl StubPaymentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, result: Result<PaymentIntent, ApiError>) -> &Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    pub fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentApi for StubPaymentApi {
    async fn create_subscription_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, ApiError> {
        self.requests.lock().unwrap().push(request);
        let next = self.results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ApiError::network("no scripted response")))
    }
}
