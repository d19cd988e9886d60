//! Aggregate state for one widget instance.

use crate::domain::analytics::{AnalyticsTracker, TrackingContext};
use crate::domain::answers::AnswerStore;
use crate::domain::auth::AuthState;
use crate::domain::foundation::{ClinicId, FormId, ProductId, TabSessionId};
use crate::domain::payment::{PaymentState, PlanOption};
use crate::domain::questionnaire::Questionnaire;
use crate::domain::sequencer::StepSequencer;

/// Static context the widget is mounted with: which product is being
/// sold, for which clinic, and how checkout is priced.
#[derive(Debug, Clone)]
pub struct ProductContext {
    pub product_id: ProductId,
    /// Explicit form override; when absent the questionnaire attached
    /// to the treatment is loaded.
    pub form_id: Option<FormId>,
    pub clinic_id: Option<ClinicId>,
    /// Bill through the clinic as merchant of record.
    pub clinic_merchant_of_record: bool,
    pub product_name: String,
    /// Flat product price, used when no tiered plans exist.
    pub flat_price_cents: Option<i64>,
    pub tiered_plans: Vec<PlanOption>,
}

/// Everything the reducer reads and writes.
///
/// One instance per widget mount. The modal may open and close several
/// times within a mount; session-scoped members reset on close while
/// tab-scoped members (the tracker's session id and dedup cache, the
/// stale-response epoch) survive.
#[derive(Debug)]
pub struct FlowState {
    pub product: ProductContext,
    /// Id of the loaded questionnaire, known after the first load.
    pub form_id: Option<FormId>,
    pub questionnaire: Option<Questionnaire>,
    pub load_error: Option<String>,
    pub answers: AnswerStore,
    pub sequencer: StepSequencer,
    pub auth: AuthState,
    pub payment: PaymentState,
    pub tracker: AnalyticsTracker,
    /// Plans offered at checkout, resolved once the questionnaire loads.
    pub plans: Vec<PlanOption>,
    /// Whether the modal is currently open.
    pub open: bool,
    /// The visitor finished checkout; the flow is done.
    pub completed: bool,
    /// The page URL was inspected for an OAuth completion signal.
    pub oauth_handled: bool,
    /// The step pointer was seated for this session.
    pub step_initialized: bool,
    /// A signup from the identity step is in flight.
    pub saving: bool,
    /// A password sign-in is in flight.
    pub is_signing_in: bool,
    /// Index the pending auto-advance was scheduled from; a manual
    /// navigation or answer edit cancels it by clearing this.
    pub auto_advance_from: Option<usize>,
    /// Bumped on every modal close; async responses captured under an
    /// older epoch are discarded.
    pub epoch: u64,
}

impl FlowState {
    pub fn new(product: ProductContext, session_id: TabSessionId, dedup_window_secs: u64) -> Self {
        Self {
            product,
            form_id: None,
            questionnaire: None,
            load_error: None,
            answers: AnswerStore::new(),
            sequencer: StepSequencer::new(),
            auth: AuthState::new(),
            payment: PaymentState::new(),
            tracker: AnalyticsTracker::new(session_id, dedup_window_secs),
            plans: Vec::new(),
            open: false,
            completed: false,
            oauth_handled: false,
            step_initialized: false,
            saving: false,
            is_signing_in: false,
            auto_advance_from: None,
            epoch: 0,
        }
    }

    pub fn authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Identifying data for analytics; `None` until the questionnaire
    /// id is known, which gates all event emission.
    pub fn tracking_context(&self) -> Option<TrackingContext> {
        let form_id = self.form_id.clone()?;
        Some(TrackingContext {
            user_id: self.auth.identity().map(|i| i.user_id.clone()),
            product_id: self.product.product_id.clone(),
            form_id,
            clinic_id: self.product.clinic_id.clone(),
            metadata: serde_json::Value::Null,
        })
    }
}
