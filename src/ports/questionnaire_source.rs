//! Questionnaire loading port.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::foundation::{FormId, ProductId};
use crate::domain::questionnaire::{Questionnaire, Step, StepCategory};

/// Port for fetching questionnaire definitions from the forms backend.
#[async_trait]
pub trait QuestionnaireSource: Send + Sync {
    /// `GET /questionnaires/{id}` - a specific questionnaire by id.
    async fn by_id(&self, form_id: &FormId) -> Result<Questionnaire, ApiError>;

    /// `GET /questionnaires/treatment/{product_id}` - the questionnaire
    /// attached to a treatment, plus its form id.
    async fn by_treatment(
        &self,
        product_id: &ProductId,
    ) -> Result<(FormId, Questionnaire), ApiError>;

    /// `GET /questionnaires/first-user-profile` - the shared
    /// identity-creation step, appended when a questionnaire lacks one.
    async fn first_user_profile(&self) -> Result<Option<Step>, ApiError>;

    /// `GET /questionnaires/standardized?category=…` - all standardized
    /// steps of a category. Fallback source for the identity step when
    /// the dedicated endpoint has nothing.
    async fn standardized(&self, category: StepCategory) -> Result<Vec<Step>, ApiError>;
}
