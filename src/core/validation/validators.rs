//! Checks behind each built-in constraint
//!
//! Every check receives the field name and a present value and returns the
//! failure message, if any.

use super::rules::Constraint;
use serde_json::Value;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

/// Whether a value counts as missing for `required`
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Check `required`
pub fn required(field: &str, value: Option<&Value>) -> Result<(), String> {
    if is_blank(value) {
        Err(format!("The {} field is required.", field))
    } else {
        Ok(())
    }
}

/// Check one non-`required` constraint against a present value
///
/// `numeric` tells size rules to measure numeric strings by value
/// rather than by length.
pub fn check(
    constraint: &Constraint,
    field: &str,
    value: &Value,
    numeric: bool,
) -> Result<(), String> {
    match constraint {
        Constraint::Required | Constraint::Nullable | Constraint::Other { .. } => Ok(()),
        Constraint::String => expect(value.is_string(), || {
            format!("The {} must be a string.", field)
        }),
        Constraint::Integer => expect(is_integer(value), || {
            format!("The {} must be an integer.", field)
        }),
        Constraint::Numeric => expect(as_number(value).is_some(), || {
            format!("The {} must be a number.", field)
        }),
        Constraint::Boolean => expect(is_boolean(value), || {
            format!("The {} field must be true or false.", field)
        }),
        Constraint::Array => expect(value.is_array(), || {
            format!("The {} must be an array.", field)
        }),
        Constraint::Email => expect(
            value
                .as_str()
                .is_some_and(|s| s.to_string().validate_email()),
            || format!("The {} must be a valid email address.", field),
        ),
        Constraint::Url => expect(
            value.as_str().is_some_and(|s| s.to_string().validate_url()),
            || format!("The {} must be a valid URL.", field),
        ),
        Constraint::Uuid => expect(
            value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok()),
            || format!("The {} must be a valid UUID.", field),
        ),
        Constraint::Date => expect(value.as_str().is_some_and(is_date), || {
            format!("The {} is not a valid date.", field)
        }),
        Constraint::DateFormat(format) => expect(
            value
                .as_str()
                .is_some_and(|s| chrono::NaiveDate::parse_from_str(s, format).is_ok()
                    || chrono::NaiveDateTime::parse_from_str(s, format).is_ok()),
            || format!("The {} does not match the format {}.", field, format),
        ),
        Constraint::Min(min) => match measure(value, numeric) {
            Some((size, unit)) if size < *min => {
                Err(format!("The {} must be at least {}{}.", field, min, unit))
            }
            _ => Ok(()),
        },
        Constraint::Max(max) => match measure(value, numeric) {
            Some((size, unit)) if size > *max => Err(format!(
                "The {} may not be greater than {}{}.",
                field, max, unit
            )),
            _ => Ok(()),
        },
        Constraint::In(allowed) => expect(
            scalar_text(value).is_some_and(|s| allowed.iter().any(|a| *a == s)),
            || format!("The selected {} is invalid.", field),
        ),
        Constraint::Regex(pattern) => expect(
            value.as_str().is_some_and(|s| pattern.is_match(s)),
            || format!("The {} format is invalid.", field),
        ),
    }
}

fn expect(ok: bool, message: impl FnOnce() -> String) -> Result<(), String> {
    if ok { Ok(()) } else { Err(message()) }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn is_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => n.as_i64().is_some_and(|n| n == 0 || n == 1),
        Value::String(s) => matches!(s.as_str(), "0" | "1"),
        _ => false,
    }
}

fn is_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

/// A number, or a string holding one
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn measure(value: &Value, numeric: bool) -> Option<(f64, &'static str)> {
    match value {
        Value::Number(n) => n.as_f64().map(|n| (n, "")),
        Value::String(s) if numeric => as_number(value)
            .map(|n| (n, ""))
            .or(Some((s.chars().count() as f64, " characters"))),
        Value::String(s) => Some((s.chars().count() as f64, " characters")),
        Value::Array(items) => Some((items.len() as f64, " items")),
        _ => None,
    }
}
