//! HTTP adapter for the questionnaire backend.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::client::BackendClient;
use crate::domain::foundation::{FormId, ProductId};
use crate::domain::questionnaire::{Questionnaire, Step, StepCategory};
use crate::ports::{ApiError, QuestionnaireSource};

pub struct HttpQuestionnaireSource {
    client: Arc<BackendClient>,
}

impl HttpQuestionnaireSource {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

/// Questionnaire payload: the schema plus its backend id.
#[derive(Deserialize)]
struct FormEnvelope {
    id: FormId,
    #[serde(flatten)]
    questionnaire: Questionnaire,
}

fn category_param(category: StepCategory) -> &'static str {
    match category {
        StepCategory::Normal => "normal",
        StepCategory::UserProfile => "user_profile",
        StepCategory::Other => "other",
    }
}

#[async_trait]
impl QuestionnaireSource for HttpQuestionnaireSource {
    async fn by_id(&self, form_id: &FormId) -> Result<Questionnaire, ApiError> {
        let envelope: FormEnvelope = self
            .client
            .get_json(&format!("questionnaires/{}", form_id.as_str()))
            .await?;
        Ok(envelope.questionnaire)
    }

    async fn by_treatment(
        &self,
        product_id: &ProductId,
    ) -> Result<(FormId, Questionnaire), ApiError> {
        let envelope: FormEnvelope = self
            .client
            .get_json(&format!("questionnaires/treatment/{}", product_id.as_str()))
            .await?;
        Ok((envelope.id, envelope.questionnaire))
    }

    async fn first_user_profile(&self) -> Result<Option<Step>, ApiError> {
        self.client.get_json("questionnaires/first-user-profile").await
    }

    async fn standardized(&self, category: StepCategory) -> Result<Vec<Step>, ApiError> {
        self.client
            .get_json(&format!(
                "questionnaires/standardized?category={}",
                category_param(category)
            ))
            .await
    }
}
