//! Analytics tracker: a passive observer of the flow.
//!
//! Per modal session: a view fires at most once, a conversion fires at
//! most once and suppresses any later drop-off, and a drop-off fires at
//! most once on whichever comes first of page unload (beacon delivery)
//! or explicit modal close (normal delivery). The dedup cache and the
//! per-tab session id outlive modal open/close cycles.

use super::event::{DropOffStage, EventKey, EventType, TrackedEvent, TrackingContext};
use super::ttl_cache::TtlCache;
use crate::domain::foundation::{TabSessionId, Timestamp};

/// How a drop-off event should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChannel {
    /// Standard network call (explicit modal close).
    Fetch,
    /// Fire-and-forget delivery that survives page teardown (unload).
    Beacon,
}

/// Session-scoped tracking state plus the tab-scoped dedup cache.
#[derive(Debug)]
pub struct AnalyticsTracker {
    session_id: TabSessionId,
    cache: TtlCache<EventKey>,
    view_tracked: bool,
    conversion_tracked: bool,
    drop_off_tracked: bool,
    last_stage: DropOffStage,
}

impl AnalyticsTracker {
    /// Creates a tracker for one browser tab.
    ///
    /// `dedup_window_secs` is the interval during which identically
    /// keyed events are dropped silently.
    pub fn new(session_id: TabSessionId, dedup_window_secs: u64) -> Self {
        Self {
            session_id,
            cache: TtlCache::new(dedup_window_secs),
            view_tracked: false,
            conversion_tracked: false,
            drop_off_tracked: false,
            last_stage: DropOffStage::Product,
        }
    }

    pub fn session_id(&self) -> TabSessionId {
        self.session_id
    }

    /// Updates the last known funnel stage as the sequencer moves.
    pub fn record_stage(&mut self, stage: DropOffStage) {
        self.last_stage = stage;
    }

    pub fn last_stage(&self) -> DropOffStage {
        self.last_stage
    }

    pub fn view_tracked(&self) -> bool {
        self.view_tracked
    }

    pub fn conversion_tracked(&self) -> bool {
        self.conversion_tracked
    }

    /// A view fires once per modal session, when the identifying data
    /// is available; re-resolving preconditions never re-fires it.
    pub fn track_view(&mut self, ctx: &TrackingContext, now: Timestamp) -> Option<TrackedEvent> {
        if self.view_tracked {
            return None;
        }
        let key = EventKey::new(ctx, EventType::View, None);
        if !self.cache.check_and_insert(key, now) {
            return None;
        }
        self.view_tracked = true;
        Some(self.event(ctx, EventType::View, None))
    }

    /// A conversion fires once, on confirmed payment, and suppresses
    /// any future drop-off for the session.
    pub fn track_conversion(
        &mut self,
        ctx: &TrackingContext,
        now: Timestamp,
    ) -> Option<TrackedEvent> {
        if self.conversion_tracked {
            return None;
        }
        let key = EventKey::new(ctx, EventType::Conversion, None);
        if !self.cache.check_and_insert(key, now) {
            return None;
        }
        self.conversion_tracked = true;
        Some(self.event(ctx, EventType::Conversion, None))
    }

    /// A drop-off fires at most once per session, only if a view was
    /// tracked and no conversion occurred, carrying the last known
    /// stage. The channel tells the caller how to deliver it.
    pub fn track_drop_off(
        &mut self,
        ctx: &TrackingContext,
        channel: DeliveryChannel,
        now: Timestamp,
    ) -> Option<(TrackedEvent, DeliveryChannel)> {
        if self.drop_off_tracked || self.conversion_tracked || !self.view_tracked {
            return None;
        }
        let key = EventKey::new(ctx, EventType::DropOff, Some(self.last_stage));
        if !self.cache.check_and_insert(key, now) {
            return None;
        }
        self.drop_off_tracked = true;
        Some((
            self.event(ctx, EventType::DropOff, Some(self.last_stage)),
            channel,
        ))
    }

    /// Resets per-session guards when the modal fully closes.
    ///
    /// The dedup cache and session id are tab-scoped and survive.
    pub fn end_session(&mut self) {
        self.view_tracked = false;
        self.conversion_tracked = false;
        self.drop_off_tracked = false;
        self.last_stage = DropOffStage::Product;
    }

    fn event(
        &self,
        ctx: &TrackingContext,
        event_type: EventType,
        drop_off_stage: Option<DropOffStage>,
    ) -> TrackedEvent {
        TrackedEvent {
            user_id: ctx.user_id.clone(),
            product_id: ctx.product_id.clone(),
            form_id: ctx.form_id.clone(),
            event_type,
            drop_off_stage,
            session_id: self.session_id,
            metadata: ctx.metadata.clone(),
        }
    }
}
