//! Conditional-logic evaluator.
//!
//! Grammar: whitespace-separated tokens, each either a condition
//! `answer_equals:<questionId>:<value>` or an operator `AND` / `OR`.
//! Evaluation is strictly left-to-right with no operator precedence and
//! no parentheses; both operands of every operator are always computed.
//!
//! This exact semantics is load-bearing: existing questionnaire content
//! relies on the left-to-right behavior of 3+ chained conditions, so it
//! must not be "corrected" to standard precedence.
//!
//! Failure policy is fail-open: a missing or entirely malformed
//! expression means the step is visible, and unparseable tokens are
//! skipped as no-ops rather than treated as failures.

use crate::domain::answers::AnswerStore;

/// Boolean operator between conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
}

/// A parsed token of the conditional-logic grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Condition { question_id: String, value: String },
    Op(Operator),
}

const CONDITION_PREFIX: &str = "answer_equals:";

/// Parses one raw token; returns `None` for anything unparseable.
fn parse_token(raw: &str) -> Option<Token> {
    match raw {
        "AND" => return Some(Token::Op(Operator::And)),
        "OR" => return Some(Token::Op(Operator::Or)),
        _ => {}
    }

    let payload = raw.strip_prefix(CONDITION_PREFIX)?;
    // Values may themselves contain ':' (times, ratios), so split once.
    let (question_id, value) = payload.split_once(':')?;
    if question_id.is_empty() {
        return None;
    }
    Some(Token::Condition {
        question_id: question_id.to_string(),
        value: value.to_string(),
    })
}

/// Evaluates a step's or question's conditional logic against the
/// current answers.
///
/// `None`, blank, or fully malformed expressions evaluate to `true`.
pub fn is_visible(logic: Option<&str>, answers: &AnswerStore) -> bool {
    let Some(logic) = logic else {
        return true;
    };
    evaluate(logic, answers)
}

/// Evaluates a conditional-logic expression, left-to-right.
pub fn evaluate(logic: &str, answers: &AnswerStore) -> bool {
    let tokens: Vec<Token> = logic.split_whitespace().filter_map(parse_token).collect();

    let mut result: Option<bool> = None;
    let mut pending_op: Option<Operator> = None;

    for token in tokens {
        match token {
            Token::Op(op) => pending_op = Some(op),
            Token::Condition { question_id, value } => {
                let matched = answers
                    .get(&question_id)
                    .map(|answer| answer.matches(&value))
                    .unwrap_or(false);

                result = Some(match (result, pending_op) {
                    // First condition seeds the running result.
                    (None, _) => matched,
                    // No operator between two conditions: left-to-right,
                    // the newer condition just replaces the result.
                    (Some(_), None) => matched,
                    (Some(acc), Some(Operator::And)) => acc && matched,
                    (Some(acc), Some(Operator::Or)) => acc || matched,
                });
                pending_op = None;
            }
        }
    }

    // No parseable condition at all: fail-open.
    result.unwrap_or(true)
}
