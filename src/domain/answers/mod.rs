//! Answer store: the mutable key→value map of collected answers.
//!
//! Everything the visitor enters flows through here, keyed by question
//! id or by the synthetic identity and shipping keys. Derived fields
//! (`bmi`, `bmiCategory`) are owned exclusively by the store's update
//! logic and are recomputed whenever any of their inputs change; they
//! are never written directly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::FieldErrors;

/// Synthetic answer keys for the identity-creation step.
pub mod identity_keys {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const MOBILE: &str = "mobile";
}

/// Synthetic answer keys for the checkout shipping form.
pub mod shipping_keys {
    pub const ADDRESS: &str = "address";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const ZIP_CODE: &str = "zipCode";
}

/// Keys owned by the derived-field logic.
pub mod derived_keys {
    pub const WEIGHT: &str = "weight";
    pub const HEIGHT_FEET: &str = "heightFeet";
    pub const HEIGHT_INCHES: &str = "heightInches";
    pub const BMI: &str = "bmi";
    pub const BMI_CATEGORY: &str = "bmiCategory";
}

/// A single collected answer value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Many(Vec<String>),
}

impl AnswerValue {
    /// True if the value counts as "no answer": empty string or empty
    /// array. Defined scalars (numbers, booleans) always count.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(s) => s.trim().is_empty(),
            AnswerValue::Many(values) => values.is_empty(),
            AnswerValue::Number(_) | AnswerValue::Bool(_) => false,
        }
    }

    /// Equality against a token value from conditional logic.
    ///
    /// Array-valued answers (multi-select) use a membership test, not
    /// identity.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            AnswerValue::Text(s) => s == value,
            AnswerValue::Number(n) => format_number(*n) == value,
            AnswerValue::Bool(b) => (if *b { "true" } else { "false" }) == value,
            AnswerValue::Many(values) => values.iter().any(|v| v == value),
        }
    }

    /// The value as text, if scalar.
    pub fn as_text(&self) -> Option<String> {
        match self {
            AnswerValue::Text(s) => Some(s.clone()),
            AnswerValue::Number(n) => Some(format_number(*n)),
            AnswerValue::Bool(b) => Some(b.to_string()),
            AnswerValue::Many(_) => None,
        }
    }

    /// The value as a number, parsing text if necessary.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        AnswerValue::Number(n)
    }
}

/// Integer-valued numbers render without a trailing `.0` so a numeric
/// answer of 5 matches the token value `5`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The mutable map of all collected answers plus per-field validation
/// errors for the current step.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: HashMap<String, AnswerValue>,
    errors: FieldErrors,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an answer and clears any stale error for that field.
    ///
    /// Writing one of the BMI inputs recomputes the derived fields;
    /// writing a derived field directly is ignored.
    pub fn set(&mut self, key: impl Into<String>, value: AnswerValue) {
        let key = key.into();
        if key == derived_keys::BMI || key == derived_keys::BMI_CATEGORY {
            return;
        }
        self.errors.clear_field(&key);
        self.answers.insert(key.clone(), value);
        if matches!(
            key.as_str(),
            derived_keys::WEIGHT | derived_keys::HEIGHT_FEET | derived_keys::HEIGHT_INCHES
        ) {
            self.recompute_bmi();
        }
    }

    /// Removes an answer (and its error) entirely.
    pub fn remove(&mut self, key: &str) {
        self.errors.clear_field(key);
        self.answers.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.get(key)
    }

    /// The answer as text, or `None` if absent or non-scalar.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.answers.get(key).and_then(AnswerValue::as_text)
    }

    /// True if the key has a non-empty answer.
    pub fn has_answer(&self, key: &str) -> bool {
        self.answers.get(key).map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Validation errors for the current step.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Mutable access for the validators.
    pub fn errors_mut(&mut self) -> &mut FieldErrors {
        &mut self.errors
    }

    /// Clears all answers and errors. Used when the modal closes.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.errors.clear();
    }

    /// A snapshot of all answers, used when creating a payment intent.
    pub fn snapshot(&self) -> HashMap<String, AnswerValue> {
        self.answers.clone()
    }

    fn recompute_bmi(&mut self) {
        let weight = self.answers.get(derived_keys::WEIGHT).and_then(AnswerValue::as_f64);
        let feet = self
            .answers
            .get(derived_keys::HEIGHT_FEET)
            .and_then(AnswerValue::as_f64);
        let inches = self
            .answers
            .get(derived_keys::HEIGHT_INCHES)
            .and_then(AnswerValue::as_f64);

        match (weight, feet, inches) {
            (Some(weight), Some(feet), Some(inches)) if weight > 0.0 && feet >= 0.0 => {
                let total_inches = feet * 12.0 + inches;
                if total_inches <= 0.0 {
                    self.clear_bmi();
                    return;
                }
                let bmi = weight * 703.0 / (total_inches * total_inches);
                let rounded = (bmi * 10.0).round() / 10.0;
                self.answers.insert(
                    derived_keys::BMI.to_string(),
                    AnswerValue::Text(format!("{:.1}", rounded)),
                );
                self.answers.insert(
                    derived_keys::BMI_CATEGORY.to_string(),
                    AnswerValue::Text(bmi_category(rounded).to_string()),
                );
            }
            _ => self.clear_bmi(),
        }
    }

    fn clear_bmi(&mut self) {
        self.answers.remove(derived_keys::BMI);
        self.answers.remove(derived_keys::BMI_CATEGORY);
    }
}

fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}
