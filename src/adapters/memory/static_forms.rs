//! In-memory questionnaire source for testing.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{FormId, ProductId};
use crate::domain::questionnaire::{Questionnaire, Step, StepCategory};
use crate::ports::{ApiError, QuestionnaireSource};

/// Serves one fixed questionnaire regardless of how it is looked up.
#[derive(Clone)]
pub struct StaticQuestionnaireSource {
    form_id: FormId,
    questionnaire: Arc<Questionnaire>,
    user_profile: Option<Step>,
    dedicated_profile_endpoint: bool,
}

impl StaticQuestionnaireSource {
    pub fn new(form_id: FormId, questionnaire: Questionnaire) -> Self {
        Self {
            form_id,
            questionnaire: Arc::new(questionnaire),
            user_profile: None,
            dedicated_profile_endpoint: true,
        }
    }

    /// Standardized identity step to append onto questionnaires that
    /// lack one.
    pub fn with_user_profile(mut self, step: Step) -> Self {
        self.user_profile = Some(step);
        self
    }

    /// Identity step served only through the standardized catalogue;
    /// the dedicated first-user-profile lookup returns nothing.
    pub fn with_standardized_user_profile(mut self, step: Step) -> Self {
        self.user_profile = Some(step);
        self.dedicated_profile_endpoint = false;
        self
    }
}

#[async_trait]
impl QuestionnaireSource for StaticQuestionnaireSource {
    async fn by_id(&self, form_id: &FormId) -> Result<Questionnaire, ApiError> {
        if form_id != &self.form_id {
            return Err(ApiError::backend(404, "form not found"));
        }
        Ok((*self.questionnaire).clone())
    }

    async fn by_treatment(
        &self,
        _product_id: &ProductId,
    ) -> Result<(FormId, Questionnaire), ApiError> {
        Ok((self.form_id.clone(), (*self.questionnaire).clone()))
    }

    async fn first_user_profile(&self) -> Result<Option<Step>, ApiError> {
        if self.dedicated_profile_endpoint {
            Ok(self.user_profile.clone())
        } else {
            Ok(None)
        }
    }

    async fn standardized(&self, category: StepCategory) -> Result<Vec<Step>, ApiError> {
        Ok(self
            .user_profile
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect())
    }
}
