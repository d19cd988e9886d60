//! Questionnaire schema types.
//!
//! The questionnaire is loaded once per modal session by the (external)
//! loader and is immutable afterwards. The flow engine only reads it:
//! the sequencer walks its steps, the conditional evaluator gates their
//! visibility, and the checkout step lives at a position that may be a
//! sentinel meaning "after the last step".

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{QuestionId, StepId};

/// Where the checkout step sits relative to the questionnaire steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutPosition {
    /// Checkout follows the last questionnaire step (the sentinel).
    #[default]
    AfterLast,
    /// Checkout sits at an explicit step index.
    At(usize),
}

/// A clinic-defined questionnaire: an ordered sequence of steps plus the
/// checkout position. Immutable once loaded for a modal session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub steps: Vec<Step>,
    #[serde(default)]
    pub checkout_step_position: CheckoutPosition,
}

impl Questionnaire {
    /// Creates a questionnaire with checkout after the last step.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            checkout_step_position: CheckoutPosition::AfterLast,
        }
    }

    /// The index that acts as the checkout sentinel for the sequencer.
    pub fn checkout_index(&self) -> usize {
        match self.checkout_step_position {
            CheckoutPosition::AfterLast => self.steps.len(),
            CheckoutPosition::At(index) => index.min(self.steps.len()),
        }
    }

    /// Looks up a step by index.
    pub fn step_at(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }
}

/// Category of a step, driving suppression and validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    /// Regular questionnaire content.
    #[default]
    Normal,
    /// Account-creation step; suppressed once the visitor is authenticated.
    UserProfile,
    /// Anything else (informational screens etc.).
    Other,
}

/// One screen of the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: StepCategory,
    /// Boolean expression gating this step's visibility; `None` means
    /// always visible.
    #[serde(default)]
    pub conditional_logic: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Step {
    /// True for steps that collect account identity and are suppressed
    /// after authentication.
    pub fn is_user_profile(&self) -> bool {
        self.category == StepCategory::UserProfile
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Text,
    Number,
    SingleChoice,
    MultipleChoice,
    Checkbox,
}

impl AnswerType {
    /// True for types whose answers come from an option list.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            AnswerType::SingleChoice | AnswerType::MultipleChoice | AnswerType::Checkbox
        )
    }
}

/// A single question within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub is_required: bool,
    /// Visibility expression over prior answers, same grammar as step
    /// conditional logic.
    #[serde(default)]
    pub conditional_logic: Option<String>,
    /// Nesting depth for follow-up questions; the first question of a
    /// step carries no level and anchors its follow-ups.
    #[serde(default)]
    pub conditional_level: Option<u32>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

/// A selectable option for choice-type questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}
