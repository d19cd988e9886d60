//! Funnel analytics events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClinicId, FormId, ProductId, TabSessionId, UserId};

/// The three funnel event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    View,
    Conversion,
    DropOff,
}

/// Coarse funnel position recorded when a visitor abandons the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropOffStage {
    /// Questionnaire content steps.
    Product,
    /// The account/identity step.
    Account,
    /// Checkout.
    Payment,
}

/// One event posted to the analytics backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    pub form_id: FormId,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_off_stage: Option<DropOffStage>,
    pub session_id: TabSessionId,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

/// Identifying data required before any event may fire.
#[derive(Debug, Clone)]
pub struct TrackingContext {
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    pub form_id: FormId,
    pub clinic_id: Option<ClinicId>,
    pub metadata: serde_json::Value,
}

/// Deduplication key: identically-keyed events within the dedup window
/// are dropped silently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub user_id: Option<String>,
    pub product_id: String,
    pub form_id: String,
    pub event_type: EventType,
    pub drop_off_stage: Option<DropOffStage>,
}

impl EventKey {
    pub fn new(
        ctx: &TrackingContext,
        event_type: EventType,
        drop_off_stage: Option<DropOffStage>,
    ) -> Self {
        Self {
            user_id: ctx.user_id.as_ref().map(|u| u.as_str().to_string()),
            product_id: ctx.product_id.as_str().to_string(),
            form_id: ctx.form_id.as_str().to_string(),
            event_type,
            drop_off_stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_camel_case_keys() {
        let event = TrackedEvent {
            user_id: Some(UserId::new("u1").unwrap()),
            product_id: ProductId::new("p1").unwrap(),
            form_id: FormId::new("f1").unwrap(),
            event_type: EventType::DropOff,
            drop_off_stage: Some(DropOffStage::Payment),
            session_id: TabSessionId::new(),
            metadata: serde_json::Value::Null,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "drop_off");
        assert_eq!(json["dropOffStage"], "payment");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn identical_contexts_produce_equal_keys() {
        let ctx = TrackingContext {
            user_id: None,
            product_id: ProductId::new("p1").unwrap(),
            form_id: FormId::new("f1").unwrap(),
            clinic_id: None,
            metadata: serde_json::Value::Null,
        };

        let a = EventKey::new(&ctx, EventType::View, None);
        let b = EventKey::new(&ctx, EventType::View, None);
        assert_eq!(a, b);

        let c = EventKey::new(&ctx, EventType::Conversion, None);
        assert_ne!(a, c);
    }
}
