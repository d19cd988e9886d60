//! Funnel analytics: events, deduplication, and session guards.

mod event;
mod tracker;
mod ttl_cache;

pub use event::{DropOffStage, EventKey, EventType, TrackedEvent, TrackingContext};
pub use tracker::{AnalyticsTracker, DeliveryChannel};
pub use ttl_cache::TtlCache;
