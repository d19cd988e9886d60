//! Analytics ingestion port.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::analytics::TrackedEvent;

/// Port for delivering analytics events to the ingestion endpoint.
///
/// `track` is the ordinary awaited path. `beacon` is the page-unload
/// path: it must not await and must not fail the caller, mirroring a
/// browser `sendBeacon` - the adapter detaches the send and drops any
/// error.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// `POST /analytics/track` - deliver one event, awaited.
    async fn track(&self, event: &TrackedEvent) -> Result<(), ApiError>;

    /// Fire-and-forget delivery for unload-time drop-off events.
    fn beacon(&self, event: TrackedEvent);
}
