//! Request-driven query filters
//!
//! A [`FilterSpec`] whitelists the request keys a resource can be filtered
//! by. [`compile`] turns the incoming request parameters into [`Predicate`]s,
//! silently dropping anything it cannot use:
//!
//! - undeclared keys never reach the query
//! - `null`, `""` and `[]` mean "not filtering on this key"
//! - a declared operator outside `= != > >= < <=` disables that filter
//! - a list value with an operator other than `=` / `!=` is dropped
//!
//! Predicates come out in the [`FilterSpec`]'s declaration order, whatever
//! order the request lists its keys in. All surviving predicates are combined
//! with AND, so the order never changes which entities match.
//!
//! # Example
//!
//! ```
//! use resource_controller::core::filter::{compile, FilterSpec, Predicate, FilterOperator};
//! use serde_json::json;
//!
//! let spec = FilterSpec::new()
//!     .implicit("status")
//!     .explicit("min_total", Some("total"), Some(">="));
//!
//! let params = json!({"status": ["open", "paid"], "min_total": "100", "secret": "x"});
//! let predicates = compile(&spec, params.as_object().unwrap());
//!
//! assert_eq!(predicates, vec![
//!     Predicate::In { field: "status".into(), values: vec![json!("open"), json!("paid")] },
//!     Predicate::Compare { field: "total".into(), operator: FilterOperator::Gte, value: json!("100") },
//! ]);
//! ```

use crate::core::store::QueryBuilder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Comparison operators accepted in filter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOperator {
    /// Parse one of `=`, `!=`, `>`, `>=`, `<`, `<=`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(FilterOperator::Eq),
            "!=" => Some(FilterOperator::Ne),
            ">" => Some(FilterOperator::Gt),
            ">=" => Some(FilterOperator::Gte),
            "<" => Some(FilterOperator::Lt),
            "<=" => Some(FilterOperator::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a declared filter key maps onto the query
///
/// The default rule is implicit: the key itself is the field and the
/// operator is `=`. The operator is kept as written so that an invalid one
/// disables the filter at request time instead of failing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Target field (defaults to the declared key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Operator (defaults to `=`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl FilterRule {
    pub fn implicit() -> Self {
        Self::default()
    }

    pub fn new(field: Option<&str>, operator: Option<&str>) -> Self {
        Self {
            field: field.map(str::to_string),
            operator: operator.map(str::to_string),
        }
    }

    /// Target field and operator for `key`, `None` when the operator is invalid
    pub fn resolve<'a>(&'a self, key: &'a str) -> Option<(&'a str, FilterOperator)> {
        let operator = match self.operator.as_deref() {
            Some(op) => FilterOperator::parse(op)?,
            None => FilterOperator::Eq,
        };
        Some((self.field.as_deref().unwrap_or(key), operator))
    }
}

/// Declared filters of a resource, in declaration order
///
/// Deserializes from either a list of keys (all implicit) or a map whose
/// values are `null` (implicit) or `{field, operator}` rules:
///
/// ```yaml
/// filters: [status, customer]
/// # or
/// filters:
///   status: ~
///   min_total: { field: total, operator: ">=" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "FilterSpecRepr")]
pub struct FilterSpec {
    rules: IndexMap<String, FilterRule>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `key` filtering on the field of the same name with `=`
    pub fn implicit(self, key: &str) -> Self {
        self.rule(key, FilterRule::implicit())
    }

    /// Declare `key` with an explicit target field and/or operator
    pub fn explicit(self, key: &str, field: Option<&str>, operator: Option<&str>) -> Self {
        self.rule(key, FilterRule::new(field, operator))
    }

    pub fn rule(mut self, key: &str, rule: FilterRule) -> Self {
        self.rules.insert(key.to_string(), rule);
        self
    }

    /// Keys a request may use
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&FilterRule> {
        self.rules.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterRule)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FilterSpec::new(), |spec, key| spec.implicit(key))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterSpecRepr {
    Keys(Vec<String>),
    Rules(IndexMap<String, Option<FilterRule>>),
}

impl From<FilterSpecRepr> for FilterSpec {
    fn from(repr: FilterSpecRepr) -> Self {
        let rules = match repr {
            FilterSpecRepr::Keys(keys) => keys
                .into_iter()
                .map(|key| (key, FilterRule::implicit()))
                .collect(),
            FilterSpecRepr::Rules(rules) => rules
                .into_iter()
                .map(|(key, rule)| (key, rule.unwrap_or_default()))
                .collect(),
        };
        Self { rules }
    }
}

/// A resolved query condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field <operator> value`
    Compare {
        field: String,
        operator: FilterOperator,
        value: Value,
    },
    /// `field IN values`
    In { field: String, values: Vec<Value> },
    /// `field NOT IN values`
    NotIn { field: String, values: Vec<Value> },
}

impl Predicate {
    /// Build the predicate for one filter, `None` when the value cannot be used
    pub fn new(field: &str, operator: FilterOperator, value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                if !items.iter().all(is_scalar) {
                    return None;
                }
                let field = field.to_string();
                let values = items.clone();
                match operator {
                    FilterOperator::Eq => Some(Predicate::In { field, values }),
                    FilterOperator::Ne => Some(Predicate::NotIn { field, values }),
                    _ => None,
                }
            }
            scalar if is_scalar(scalar) => Some(Predicate::Compare {
                field: field.to_string(),
                operator,
                value: scalar.clone(),
            }),
            _ => None,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::In { field, .. }
            | Predicate::NotIn { field, .. } => field,
        }
    }

    /// Add this condition to a query
    pub fn apply<T>(&self, query: &mut dyn QueryBuilder<T>) {
        match self {
            Predicate::Compare {
                field,
                operator: FilterOperator::Eq,
                value,
            } => query.where_equals(field, value.clone()),
            Predicate::Compare {
                field,
                operator,
                value,
            } => query.where_compare(field, *operator, value.clone()),
            Predicate::In { field, values } => query.where_in(field, values.clone()),
            Predicate::NotIn { field, values } => query.where_not_in(field, values.clone()),
        }
    }
}

/// Compile request parameters into predicates, in declaration order
pub fn compile(spec: &FilterSpec, params: &Map<String, Value>) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    for (key, rule) in spec.iter() {
        let Some(value) = params.get(key.as_str()) else {
            continue;
        };
        if is_empty_value(value) {
            continue;
        }

        let Some((field, operator)) = rule.resolve(key) else {
            tracing::debug!(
                filter = %key,
                operator = ?rule.operator,
                "skipping filter with unsupported operator"
            );
            continue;
        };

        match Predicate::new(field, operator, value) {
            Some(predicate) => predicates.push(predicate),
            None => tracing::debug!(
                filter = %key,
                operator = %operator,
                "skipping filter with unusable value"
            ),
        }
    }

    predicates
}

/// Compile the filters and add them to `query`
pub fn apply_filters<T>(
    spec: &FilterSpec,
    params: &Map<String, Value>,
    query: &mut dyn QueryBuilder<T>,
) -> usize {
    let predicates = compile(spec, params);
    for predicate in &predicates {
        predicate.apply(query);
    }
    predicates.len()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
