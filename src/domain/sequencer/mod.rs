//! Step sequencer: owns the current step pointer and the skip rules.
//!
//! The pointer ranges over `[0, checkout_index]`, where `checkout_index`
//! is the checkout sentinel. It must always rest on a step whose
//! conditional logic evaluates true against current answers, or on the
//! sentinel, and never on a `user_profile` step once the visitor is
//! authenticated. Becoming authenticated does not move the pointer;
//! only the next `advance`/`retreat`/`visible_step_at` call applies the
//! new suppression rule.

use crate::domain::answers::{identity_keys, shipping_keys, AnswerStore};
use crate::domain::conditional;
use crate::domain::foundation::FieldErrors;
use crate::domain::payment::PaymentStatus;
use crate::domain::questionnaire::{Question, Questionnaire, Step, StepCategory};

/// Result of an `advance` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to another questionnaire step.
    Moved,
    /// Reached (or stayed on) the checkout sentinel.
    Checkout,
    /// On checkout with payment succeeded: the flow submits.
    Submit,
    /// Validation failed; per-field errors were populated.
    Blocked,
}

/// The step pointer plus the skip/validation logic around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSequencer {
    current_index: usize,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    pub fn new() -> Self {
        Self { current_index: 0 }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// True when the pointer sits on the checkout sentinel.
    pub fn is_on_checkout(&self, questionnaire: &Questionnaire) -> bool {
        self.current_index >= questionnaire.checkout_index()
    }

    /// Snaps the pointer to the first eligible step (or checkout).
    ///
    /// Runs once per modal session, guarded by the flow state's
    /// `step_initialized` flag.
    pub fn initialize(
        &mut self,
        questionnaire: &Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) {
        self.current_index = self
            .eligible_index_from(0, questionnaire, answers, authenticated)
            .unwrap_or_else(|| questionnaire.checkout_index());
    }

    /// Scans forward from `index`, returning the first step that is not
    /// a suppressed `user_profile` step and whose conditional logic
    /// evaluates true. Returns `None` once checkout is reached.
    pub fn visible_step_at<'q>(
        &self,
        index: usize,
        questionnaire: &'q Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) -> Option<&'q Step> {
        self.eligible_index_from(index, questionnaire, answers, authenticated)
            .and_then(|i| questionnaire.step_at(i))
    }

    /// The step the pointer currently rests on, if not on checkout.
    pub fn current_step<'q>(
        &self,
        questionnaire: &'q Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) -> Option<&'q Step> {
        self.visible_step_at(self.current_index, questionnaire, answers, authenticated)
    }

    /// Validates the current step and, if it passes, moves the pointer
    /// to the next eligible step or to the checkout sentinel.
    ///
    /// Never fails with an error: a validation failure reports
    /// [`AdvanceOutcome::Blocked`] and leaves messages in the answer
    /// store's error map.
    pub fn advance(
        &mut self,
        questionnaire: &Questionnaire,
        answers: &mut AnswerStore,
        authenticated: bool,
        payment_status: PaymentStatus,
    ) -> AdvanceOutcome {
        if self.is_on_checkout(questionnaire) {
            if validate_checkout(answers, payment_status) {
                return AdvanceOutcome::Submit;
            }
            return AdvanceOutcome::Blocked;
        }

        // The pointer may rest on a step that suppression has since made
        // ineligible; resolve to the effective current step first.
        let Some(current) =
            self.eligible_index_from(self.current_index, questionnaire, answers, authenticated)
        else {
            self.current_index = questionnaire.checkout_index();
            return AdvanceOutcome::Checkout;
        };

        let step = questionnaire
            .step_at(current)
            .expect("eligible index is in range");
        if !validate_step(step, answers) {
            return AdvanceOutcome::Blocked;
        }

        match self.eligible_index_from(current + 1, questionnaire, answers, authenticated) {
            Some(next) => {
                self.current_index = next;
                AdvanceOutcome::Moved
            }
            None => {
                self.current_index = questionnaire.checkout_index();
                AdvanceOutcome::Checkout
            }
        }
    }

    /// Moves the pointer back to the previous eligible step, skipping
    /// suppressed steps identically. Does not retreat past the first
    /// eligible step.
    pub fn retreat(
        &mut self,
        questionnaire: &Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) {
        let mut index = self.current_index.min(questionnaire.checkout_index());
        while index > 0 {
            index -= 1;
            if self.is_eligible(index, questionnaire, answers, authenticated) {
                self.current_index = index;
                return;
            }
        }
    }

    /// Count of all eligible steps plus one for checkout; used for
    /// progress indicators.
    pub fn total_visible_steps(
        &self,
        questionnaire: &Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) -> usize {
        let steps = (0..questionnaire.checkout_index())
            .filter(|&i| self.is_eligible(i, questionnaire, answers, authenticated))
            .count();
        steps + 1
    }

    /// 1-based ordinal of the current step among only the visible
    /// steps. Always at least 1, even mid-transition.
    pub fn visible_step_number(
        &self,
        questionnaire: &Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) -> usize {
        let preceding = (0..self.current_index.min(questionnaire.checkout_index()))
            .filter(|&i| self.is_eligible(i, questionnaire, answers, authenticated))
            .count();
        preceding + 1
    }

    /// Snaps the pointer forward when the step it rests on has become
    /// ineligible (authentication suppressed it, or an answer changed
    /// its conditional logic). No validation runs; the visitor is not
    /// being advanced, only re-seated. No-op while the pointer rests on
    /// an eligible step.
    pub fn resync(
        &mut self,
        questionnaire: &Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) {
        if self.is_on_checkout(questionnaire)
            || self.is_eligible(self.current_index, questionnaire, answers, authenticated)
        {
            return;
        }
        self.current_index = self
            .eligible_index_from(self.current_index, questionnaire, answers, authenticated)
            .unwrap_or_else(|| questionnaire.checkout_index());
    }

    /// Resets the pointer for a fresh modal session.
    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    fn eligible_index_from(
        &self,
        from: usize,
        questionnaire: &Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) -> Option<usize> {
        (from..questionnaire.checkout_index())
            .find(|&i| self.is_eligible(i, questionnaire, answers, authenticated))
    }

    fn is_eligible(
        &self,
        index: usize,
        questionnaire: &Questionnaire,
        answers: &AnswerStore,
        authenticated: bool,
    ) -> bool {
        let Some(step) = questionnaire.step_at(index) else {
            return false;
        };
        if authenticated && step.is_user_profile() {
            return false;
        }
        conditional::is_visible(step.conditional_logic.as_deref(), answers)
    }
}

/// True when a question is visible given current answers.
pub fn question_visible(question: &Question, answers: &AnswerStore) -> bool {
    conditional::is_visible(question.conditional_logic.as_deref(), answers)
}

/// Validates one step, populating per-field errors on failure.
pub fn validate_step(step: &Step, answers: &mut AnswerStore) -> bool {
    let mut errors = FieldErrors::new();
    match step.category {
        StepCategory::UserProfile => validate_identity(answers, &mut errors),
        _ => validate_questions(step, answers, &mut errors),
    }
    let ok = errors.is_empty();
    *answers.errors_mut() = errors;
    ok
}

/// Non-mutating check, used to decide whether a committed single-choice
/// answer may auto-advance the step.
pub fn step_is_valid(step: &Step, answers: &AnswerStore) -> bool {
    let mut errors = FieldErrors::new();
    match step.category {
        StepCategory::UserProfile => validate_identity(answers, &mut errors),
        _ => validate_questions(step, answers, &mut errors),
    }
    errors.is_empty()
}

/// Checkout validation: shipping fields present and payment succeeded.
pub fn validate_checkout(answers: &mut AnswerStore, payment_status: PaymentStatus) -> bool {
    let mut errors = FieldErrors::new();
    for (key, label) in [
        (shipping_keys::ADDRESS, "Address"),
        (shipping_keys::CITY, "City"),
        (shipping_keys::STATE, "State"),
        (shipping_keys::ZIP_CODE, "ZIP code"),
    ] {
        if !answers.has_answer(key) {
            errors.insert(key, format!("{} is required", label));
        }
    }
    let ok = errors.is_empty() && payment_status == PaymentStatus::Succeeded;
    *answers.errors_mut() = errors;
    ok
}

fn validate_identity(answers: &AnswerStore, errors: &mut FieldErrors) {
    for (key, label) in [
        (identity_keys::FIRST_NAME, "First name"),
        (identity_keys::LAST_NAME, "Last name"),
        (identity_keys::MOBILE, "Mobile number"),
    ] {
        if !answers.has_answer(key) {
            errors.insert(key, format!("{} is required", label));
        }
    }
    match answers.get_text(identity_keys::EMAIL) {
        Some(email) if email.contains('@') => {}
        Some(_) => errors.insert(identity_keys::EMAIL, "Enter a valid email address"),
        None => errors.insert(identity_keys::EMAIL, "Email is required"),
    }
}

fn validate_questions(step: &Step, answers: &AnswerStore, errors: &mut FieldErrors) {
    for question in &step.questions {
        if !question.is_required || !question_visible(question, answers) {
            continue;
        }
        if !answers.has_answer(question.id.as_str()) {
            errors.insert(question.id.as_str(), "This field is required");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answers::AnswerValue;
    use crate::domain::foundation::{QuestionId, StepId};
    use crate::domain::questionnaire::{AnswerType, CheckoutPosition};

    fn question(id: &str, required: bool, logic: Option<&str>) -> Question {
        Question {
            id: QuestionId::new(id).unwrap(),
            question_text: id.to_string(),
            answer_type: AnswerType::SingleChoice,
            is_required: required,
            conditional_logic: logic.map(str::to_string),
            conditional_level: None,
            options: vec![],
        }
    }

    fn step(id: &str, category: StepCategory, logic: Option<&str>, questions: Vec<Question>) -> Step {
        Step {
            id: StepId::new(id).unwrap(),
            title: id.to_string(),
            description: String::new(),
            category,
            conditional_logic: logic.map(str::to_string),
            questions,
        }
    }

    fn three_step_questionnaire() -> Questionnaire {
        Questionnaire::new(vec![
            step("s0", StepCategory::Normal, None, vec![]),
            step("s1", StepCategory::UserProfile, None, vec![]),
            step("s2", StepCategory::Normal, None, vec![]),
        ])
    }

    fn filled_identity(answers: &mut AnswerStore) {
        answers.set(identity_keys::FIRST_NAME, AnswerValue::from("Ada"));
        answers.set(identity_keys::LAST_NAME, AnswerValue::from("Lovelace"));
        answers.set(identity_keys::EMAIL, AnswerValue::from("ada@example.com"));
        answers.set(identity_keys::MOBILE, AnswerValue::from("555-0100"));
    }

    #[test]
    fn unauthenticated_visitor_walks_every_step() {
        let q = three_step_questionnaire();
        let mut answers = AnswerStore::new();
        filled_identity(&mut answers);
        let mut seq = StepSequencer::new();

        assert_eq!(seq.visible_step_number(&q, &answers, false), 1);
        assert_eq!(seq.total_visible_steps(&q, &answers, false), 4);

        assert_eq!(seq.advance(&q, &mut answers, false, PaymentStatus::Idle), AdvanceOutcome::Moved);
        assert_eq!(seq.visible_step_number(&q, &answers, false), 2);
        assert_eq!(seq.advance(&q, &mut answers, false, PaymentStatus::Idle), AdvanceOutcome::Moved);
        assert_eq!(seq.visible_step_number(&q, &answers, false), 3);
        assert_eq!(seq.advance(&q, &mut answers, false, PaymentStatus::Idle), AdvanceOutcome::Checkout);
        assert_eq!(seq.visible_step_number(&q, &answers, false), 4);
        assert!(seq.is_on_checkout(&q));
    }

    #[test]
    fn user_profile_steps_are_skipped_once_authenticated() {
        let q = three_step_questionnaire();
        let mut answers = AnswerStore::new();
        let mut seq = StepSequencer::new();

        assert_eq!(seq.advance(&q, &mut answers, true, PaymentStatus::Idle), AdvanceOutcome::Moved);
        // index jumped straight to s2, skipping the user_profile step
        assert_eq!(seq.current_index(), 2);

        // the skip invariant holds for every scan position
        for i in 0..3 {
            if let Some(step) = seq.visible_step_at(i, &q, &answers, true) {
                assert_ne!(step.category, StepCategory::UserProfile);
            }
        }
    }

    #[test]
    fn authenticating_mid_flow_shrinks_the_visible_total() {
        // Scenario A: authenticated while resting on the user_profile step.
        let q = three_step_questionnaire();
        let mut answers = AnswerStore::new();
        filled_identity(&mut answers);
        let mut seq = StepSequencer::new();

        assert_eq!(seq.total_visible_steps(&q, &answers, false), 4);
        seq.advance(&q, &mut answers, false, PaymentStatus::Idle);
        assert_eq!(seq.current_index(), 1);

        // Identity gets set while the pointer rests on index 1. The
        // pointer is not mutated, but totals and the next advance
        // respect the new suppression rule.
        assert_eq!(seq.current_index(), 1);
        assert_eq!(seq.total_visible_steps(&q, &answers, true), 3);

        assert_eq!(seq.advance(&q, &mut answers, true, PaymentStatus::Idle), AdvanceOutcome::Moved);
        assert_eq!(seq.current_index(), 2);
    }

    #[test]
    fn step_number_is_always_at_least_one() {
        let q = three_step_questionnaire();
        let answers = AnswerStore::new();
        let seq = StepSequencer::new();
        assert!(seq.visible_step_number(&q, &answers, true) >= 1);
        assert!(seq.visible_step_number(&q, &answers, false) >= 1);
    }

    #[test]
    fn step_number_is_non_decreasing_across_advances() {
        let q = three_step_questionnaire();
        let mut answers = AnswerStore::new();
        filled_identity(&mut answers);
        let mut seq = StepSequencer::new();

        let mut last = 0;
        loop {
            let number = seq.visible_step_number(&q, &answers, false);
            assert!(number > last, "step number must be monotonic");
            assert!(number <= seq.total_visible_steps(&q, &answers, false));
            last = number;
            match seq.advance(&q, &mut answers, false, PaymentStatus::Idle) {
                AdvanceOutcome::Moved => {}
                _ => break,
            }
        }
    }

    #[test]
    fn conditionally_hidden_steps_are_skipped() {
        let q = Questionnaire::new(vec![
            step("s0", StepCategory::Normal, None, vec![]),
            step("s1", StepCategory::Normal, Some("answer_equals:q1:yes"), vec![]),
            step("s2", StepCategory::Normal, None, vec![]),
        ]);
        let mut answers = AnswerStore::new();
        answers.set("q1", AnswerValue::from("no"));
        let mut seq = StepSequencer::new();

        seq.advance(&q, &mut answers, false, PaymentStatus::Idle);
        assert_eq!(seq.current_index(), 2);

        // flipping the answer restores the hidden step on the way back
        answers.set("q1", AnswerValue::from("yes"));
        seq.retreat(&q, &answers, false);
        assert_eq!(seq.current_index(), 1);
    }

    #[test]
    fn retreat_does_not_pass_index_zero() {
        let q = three_step_questionnaire();
        let answers = AnswerStore::new();
        let mut seq = StepSequencer::new();

        seq.retreat(&q, &answers, false);
        assert_eq!(seq.current_index(), 0);
    }

    #[test]
    fn retreat_skips_suppressed_user_profile_steps() {
        let q = three_step_questionnaire();
        let mut answers = AnswerStore::new();
        let mut seq = StepSequencer::new();
        seq.advance(&q, &mut answers, true, PaymentStatus::Idle);
        assert_eq!(seq.current_index(), 2);

        seq.retreat(&q, &answers, true);
        assert_eq!(seq.current_index(), 0);
    }

    #[test]
    fn missing_required_answers_block_advance_with_field_errors() {
        let q = Questionnaire::new(vec![step(
            "s0",
            StepCategory::Normal,
            None,
            vec![question("q1", true, None)],
        )]);
        let mut answers = AnswerStore::new();
        let mut seq = StepSequencer::new();

        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Idle),
            AdvanceOutcome::Blocked
        );
        assert_eq!(answers.errors().get("q1"), Some("This field is required"));
        assert_eq!(seq.current_index(), 0);

        answers.set("q1", AnswerValue::from("yes"));
        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Idle),
            AdvanceOutcome::Checkout
        );
    }

    #[test]
    fn hidden_required_questions_do_not_block() {
        let q = Questionnaire::new(vec![step(
            "s0",
            StepCategory::Normal,
            None,
            vec![
                question("q1", true, None),
                question("q2", true, Some("answer_equals:q1:yes")),
            ],
        )]);
        let mut answers = AnswerStore::new();
        answers.set("q1", AnswerValue::from("no"));
        let mut seq = StepSequencer::new();

        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Idle),
            AdvanceOutcome::Checkout
        );
    }

    #[test]
    fn identity_step_requires_all_fields_and_valid_email() {
        let q = Questionnaire::new(vec![step("s0", StepCategory::UserProfile, None, vec![])]);
        let mut answers = AnswerStore::new();
        answers.set(identity_keys::FIRST_NAME, AnswerValue::from("Ada"));
        answers.set(identity_keys::LAST_NAME, AnswerValue::from("Lovelace"));
        answers.set(identity_keys::EMAIL, AnswerValue::from("not-an-email"));
        answers.set(identity_keys::MOBILE, AnswerValue::from("555-0100"));
        let mut seq = StepSequencer::new();

        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Idle),
            AdvanceOutcome::Blocked
        );
        assert_eq!(
            answers.errors().get(identity_keys::EMAIL),
            Some("Enter a valid email address")
        );

        answers.set(identity_keys::EMAIL, AnswerValue::from("ada@example.com"));
        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Idle),
            AdvanceOutcome::Checkout
        );
    }

    #[test]
    fn checkout_requires_shipping_and_succeeded_payment() {
        let q = Questionnaire::new(vec![]);
        let mut answers = AnswerStore::new();
        let mut seq = StepSequencer::new();
        assert!(seq.is_on_checkout(&q));

        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Idle),
            AdvanceOutcome::Blocked
        );
        assert!(answers.errors().get(shipping_keys::ADDRESS).is_some());

        answers.set(shipping_keys::ADDRESS, AnswerValue::from("1 Main St"));
        answers.set(shipping_keys::CITY, AnswerValue::from("Springfield"));
        answers.set(shipping_keys::STATE, AnswerValue::from("IL"));
        answers.set(shipping_keys::ZIP_CODE, AnswerValue::from("62704"));

        // shipping alone is not enough
        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Processing),
            AdvanceOutcome::Blocked
        );
        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Succeeded),
            AdvanceOutcome::Submit
        );
    }

    #[test]
    fn explicit_checkout_position_bounds_the_walk() {
        let mut q = three_step_questionnaire();
        q.checkout_step_position = CheckoutPosition::At(2);
        let mut answers = AnswerStore::new();
        filled_identity(&mut answers);
        let mut seq = StepSequencer::new();

        assert_eq!(seq.total_visible_steps(&q, &answers, false), 3);
        seq.advance(&q, &mut answers, false, PaymentStatus::Idle);
        assert_eq!(
            seq.advance(&q, &mut answers, false, PaymentStatus::Idle),
            AdvanceOutcome::Checkout
        );
    }

    #[test]
    fn resync_moves_off_a_suppressed_step_without_validation() {
        let q = three_step_questionnaire();
        let mut answers = AnswerStore::new();
        let mut seq = StepSequencer::new();
        seq.advance(&q, &mut answers, false, PaymentStatus::Idle);
        assert_eq!(seq.current_index(), 1);

        // authenticated while resting on the user_profile step
        seq.resync(&q, &answers, true);
        assert_eq!(seq.current_index(), 2);

        // resync on an eligible step is a no-op
        seq.resync(&q, &answers, true);
        assert_eq!(seq.current_index(), 2);
    }

    #[test]
    fn initialize_skips_leading_ineligible_steps() {
        let q = Questionnaire::new(vec![
            step("s0", StepCategory::UserProfile, None, vec![]),
            step("s1", StepCategory::Normal, None, vec![]),
        ]);
        let answers = AnswerStore::new();
        let mut seq = StepSequencer::new();

        seq.initialize(&q, &answers, true);
        assert_eq!(seq.current_index(), 1);
    }
}
