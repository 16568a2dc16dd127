//! Structured validation rules
//!
//! Rules are declared per field as a list of [`Constraint`]s. They can be
//! written in the familiar pipe-delimited form (`"required|email|max:255"`)
//! and are parsed once into typed constraints, so deriving update rules is a
//! filter over a list rather than string surgery.

use crate::core::error::RuleError;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A single rule applied to a field
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Field must be present and not empty
    Required,
    /// `null` is accepted and skips the other constraints
    Nullable,
    String,
    Integer,
    Numeric,
    Boolean,
    Array,
    Email,
    Url,
    Uuid,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    Date,
    /// A date in the given chrono format
    DateFormat(String),
    /// Minimum value, length or item count
    Min(f64),
    /// Maximum value, length or item count
    Max(f64),
    /// Value must be one of the listed strings
    In(Vec<String>),
    /// String must match the pattern
    Regex(Regex),
    /// A rule the built-in validator does not know (e.g. `unique`)
    ///
    /// Kept so that custom validators and rule derivation still see it.
    Other { name: String, args: Vec<String> },
}

impl Constraint {
    /// The rule name as written in rule strings
    pub fn name(&self) -> &str {
        match self {
            Constraint::Required => "required",
            Constraint::Nullable => "nullable",
            Constraint::String => "string",
            Constraint::Integer => "integer",
            Constraint::Numeric => "numeric",
            Constraint::Boolean => "boolean",
            Constraint::Array => "array",
            Constraint::Email => "email",
            Constraint::Url => "url",
            Constraint::Uuid => "uuid",
            Constraint::Date => "date",
            Constraint::DateFormat(_) => "date_format",
            Constraint::Min(_) => "min",
            Constraint::Max(_) => "max",
            Constraint::In(_) => "in",
            Constraint::Regex(_) => "regex",
            Constraint::Other { name, .. } => name,
        }
    }

    /// Whether this is the `required` marker
    pub fn is_required(&self) -> bool {
        matches!(self, Constraint::Required)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::DateFormat(format) => write!(f, "date_format:{}", format),
            Constraint::Min(n) => write!(f, "min:{}", n),
            Constraint::Max(n) => write!(f, "max:{}", n),
            Constraint::In(values) => write!(f, "in:{}", values.join(",")),
            Constraint::Regex(pattern) => write!(f, "regex:{}", pattern.as_str()),
            Constraint::Other { name, args } if args.is_empty() => write!(f, "{}", name),
            Constraint::Other { name, args } => write!(f, "{}:{}", name, args.join(",")),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl FromStr for Constraint {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match s.trim().split_once(':') {
            Some((name, argument)) => (name.trim(), Some(argument.trim())),
            None => (s.trim(), None),
        };

        let constraint = match name {
            "required" => Constraint::Required,
            "nullable" => Constraint::Nullable,
            "string" => Constraint::String,
            "integer" | "int" => Constraint::Integer,
            "numeric" => Constraint::Numeric,
            "boolean" | "bool" => Constraint::Boolean,
            "array" => Constraint::Array,
            "email" => Constraint::Email,
            "url" => Constraint::Url,
            "uuid" => Constraint::Uuid,
            "date" => Constraint::Date,
            "date_format" => Constraint::DateFormat(required_argument(name, argument)?.to_string()),
            "min" => Constraint::Min(number_argument(name, argument)?),
            "max" => Constraint::Max(number_argument(name, argument)?),
            "in" => Constraint::In(
                required_argument(name, argument)?
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .collect(),
            ),
            "regex" => {
                let pattern = required_argument(name, argument)?;
                let pattern = pattern
                    .strip_prefix('/')
                    .and_then(|p| p.strip_suffix('/'))
                    .unwrap_or(pattern);
                Constraint::Regex(Regex::new(pattern)?)
            }
            other => Constraint::Other {
                name: other.to_string(),
                args: argument
                    .map(|a| a.split(',').map(|v| v.trim().to_string()).collect())
                    .unwrap_or_default(),
            },
        };

        Ok(constraint)
    }
}

fn required_argument<'a>(rule: &str, argument: Option<&'a str>) -> Result<&'a str, RuleError> {
    argument
        .filter(|a| !a.is_empty())
        .ok_or_else(|| RuleError::MissingArgument {
            rule: rule.to_string(),
        })
}

fn number_argument(rule: &str, argument: Option<&str>) -> Result<f64, RuleError> {
    let argument = required_argument(rule, argument)?;
    argument
        .parse::<f64>()
        .map_err(|_| RuleError::InvalidArgument {
            rule: rule.to_string(),
            argument: argument.to_string(),
        })
}

/// The constraints of one field
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "FieldRulesRepr")]
pub struct FieldRules(Vec<Constraint>);

impl FieldRules {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self(constraints)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_required(&self) -> bool {
        self.0.iter().any(Constraint::is_required)
    }

    /// Whether a constraint with this rule name is present
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|c| c.name() == name)
    }

    /// The same constraints with every `required` marker removed
    pub fn without_required(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|c| !c.is_required())
                .cloned()
                .collect(),
        )
    }
}

impl FromStr for FieldRules {
    type Err = RuleError;

    /// Parse a pipe-delimited rule string; empty segments are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('|')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Constraint::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("|"))
    }
}

/// Rules may be declared as `"required|email"` or `["required", "email"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRulesRepr {
    Pipe(String),
    List(Vec<String>),
}

impl TryFrom<FieldRulesRepr> for FieldRules {
    type Error = RuleError;

    fn try_from(repr: FieldRulesRepr) -> Result<Self, Self::Error> {
        match repr {
            FieldRulesRepr::Pipe(s) => s.parse(),
            FieldRulesRepr::List(items) => items
                .iter()
                .map(|item| item.parse::<Constraint>())
                .collect::<Result<Vec<_>, _>>()
                .map(Self),
        }
    }
}

/// Rules for every validated field, in declaration order
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(IndexMap<String, FieldRules>);

impl RuleSet {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Parse `(field, "rule|rule")` pairs
    ///
    /// ```
    /// use resource_controller::core::validation::RuleSet;
    ///
    /// let rules = RuleSet::parse([("name", "required|string"), ("email", "required|email")])?;
    /// assert!(rules.get("email").unwrap().is_required());
    /// # Ok::<(), resource_controller::core::error::RuleError>(())
    /// ```
    pub fn parse<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, RuleError> {
        let mut rules = Self::new();
        for (field, spec) in pairs {
            rules.insert(field, spec.parse()?);
        }
        Ok(rules)
    }

    /// Add a field parsed from a rule string (builder style)
    pub fn rule(mut self, field: &str, spec: &str) -> Result<Self, RuleError> {
        self.insert(field, spec.parse()?);
        Ok(self)
    }

    pub fn insert(&mut self, field: &str, rules: FieldRules) {
        self.0.insert(field.to_string(), rules);
    }

    pub fn get(&self, field: &str) -> Option<&FieldRules> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldRules)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every field with its `required` marker removed
    pub fn without_required(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(field, rules)| (field.clone(), rules.without_required()))
                .collect(),
        )
    }

    /// Rules for partial updates
    ///
    /// Starts from these rules without `required` and lets the fields of
    /// `overrides` replace the derived ones.
    pub fn for_update(&self, overrides: Option<&RuleSet>) -> Self {
        let mut derived = self.without_required();
        if let Some(overrides) = overrides {
            for (field, rules) in overrides.iter() {
                derived.0.insert(field.clone(), rules.clone());
            }
        }
        derived
    }
}
