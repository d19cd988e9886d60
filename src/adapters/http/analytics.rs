//! HTTP adapter for analytics ingestion.

use async_trait::async_trait;
use std::sync::Arc;

use super::client::BackendClient;
use crate::domain::analytics::TrackedEvent;
use crate::ports::{AnalyticsSink, ApiError};

pub struct HttpAnalyticsSink {
    client: Arc<BackendClient>,
}

impl HttpAnalyticsSink {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn track(&self, event: &TrackedEvent) -> Result<(), ApiError> {
        self.client.post_unit("analytics/track", event).await
    }

    /// Detached delivery that survives the caller going away, standing
    /// in for a browser `sendBeacon`. Errors are logged and swallowed.
    fn beacon(&self, event: TrackedEvent) {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            if let Err(error) = client.post_unit("analytics/track", &event).await {
                tracing::debug!(%error, "beacon delivery failed");
            }
        });
    }
}
