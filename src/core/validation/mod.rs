//! Validation of request bodies against declared rules
//!
//! The controller only depends on the [`Validator`] trait. [`RuleValidator`]
//! is the built-in implementation covering the constraints of
//! [`rules::Constraint`]; applications needing database-backed rules such as
//! `unique` plug in their own validator.

pub mod rules;
pub mod validators;

pub use rules::{Constraint, FieldRules, RuleSet};

use serde_json::{Map, Value};

/// Result of validating a payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Every failure message, in rule declaration order
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validation engine used by the controller
pub trait Validator: Send + Sync {
    /// Validate `data` against `rules`, collecting all failures
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> ValidationOutcome;
}

/// Built-in validator for [`Constraint`]s
///
/// - `required` fails for missing, `null`, blank strings and empty lists
/// - missing fields and blank strings skip every other constraint
/// - `null` skips the other constraints when the field is `nullable`
/// - unknown rules ([`Constraint::Other`]) are accepted
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl Validator for RuleValidator {
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> ValidationOutcome {
        let mut errors = Vec::new();

        for (field, field_rules) in rules.iter() {
            let value = data.get(field.as_str());

            if field_rules.is_required() {
                if let Err(message) = validators::required(field, value) {
                    errors.push(message);
                    continue;
                }
            }

            let Some(value) = value else {
                continue;
            };
            if matches!(value, Value::String(s) if s.trim().is_empty()) {
                continue;
            }
            if value.is_null() && field_rules.has("nullable") {
                continue;
            }

            let numeric = field_rules.has("numeric") || field_rules.has("integer");
            for constraint in field_rules.iter() {
                if let Err(message) = validators::check(constraint, field, value, numeric) {
                    errors.push(message);
                }
            }
        }

        ValidationOutcome::failed(errors)
    }
}
