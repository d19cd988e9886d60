//! Recording sequence-trigger backend for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::{OrderId, UserId};
use crate::ports::{ApiError, SequenceTriggerApi};

/// Captures checkout triggers instead of delivering them.
#[derive(Clone, Default)]
pub struct RecordingSequenceTrigger {
    triggers: Arc<Mutex<Vec<(UserId, Option<OrderId>)>>>,
}

impl RecordingSequenceTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggers(&self) -> Vec<(UserId, Option<OrderId>)> {
        self.triggers.lock().unwrap().clone()
    }
}

#[async_trait]
impl SequenceTriggerApi for RecordingSequenceTrigger {
    async fn checkout_completed(
        &self,
        user_id: &UserId,
        order_id: Option<&OrderId>,
    ) -> Result<(), ApiError> {
        self.triggers
            .lock()
            .unwrap()
            .push((user_id.clone(), order_id.cloned()));
        Ok(())
    }
}
