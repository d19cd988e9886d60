//! Recording analytics sink for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::analytics::TrackedEvent;
use crate::ports::{AnalyticsSink, ApiError};

/// How a recorded event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Tracked,
    Beaconed,
}

/// Captures every delivered event instead of sending it anywhere.
#[derive(Clone, Default)]
pub struct RecordingAnalyticsSink {
    events: Arc<Mutex<Vec<(TrackedEvent, Delivery)>>>,
    fail_tracks: Arc<Mutex<bool>>,
}

impl RecordingAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `track` calls fail with a network error.
    pub fn fail_tracks(&self) {
        *self.fail_tracks.lock().unwrap() = true;
    }

    pub fn events(&self) -> Vec<(TrackedEvent, Delivery)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingAnalyticsSink {
    async fn track(&self, event: &TrackedEvent) -> Result<(), ApiError> {
        if *self.fail_tracks.lock().unwrap() {
            return Err(ApiError::network("scripted failure"));
        }
        self.events
            .lock()
            .unwrap()
            .push((event.clone(), Delivery::Tracked));
        Ok(())
    }

    fn beacon(&self, event: TrackedEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event, Delivery::Beaconed));
    }
}
