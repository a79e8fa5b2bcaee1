//! Declarative field constraints.
//!
//! Each entity lists its fields with the constraints they must satisfy; the
//! list order is the order in which violations are reported.

use serde_json::Value;
use validator::ValidateEmail;

use super::entity::parse_timestamp;

/// A single check applied to a field's JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Not null and not an empty string
    Required,
    IsString,
    /// Minimum length in characters
    MinLength(usize),
    /// Maximum length in characters
    MaxLength(usize),
    Email,
    Uuid,
    /// ISO 8601 date or date-time
    DateString,
}

impl Constraint {
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Constraint::Required => !matches!(value, Value::Null) && value.as_str() != Some(""),
            Constraint::IsString => value.is_string(),
            Constraint::MinLength(min) => value
                .as_str()
                .is_some_and(|s| s.chars().count() >= *min),
            Constraint::MaxLength(max) => value
                .as_str()
                .is_some_and(|s| s.chars().count() <= *max),
            Constraint::Email => value.as_str().is_some_and(|s| s.validate_email()),
            Constraint::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
            Constraint::DateString => value
                .as_str()
                .is_some_and(|s| parse_timestamp(s).is_some()),
        }
    }

    pub fn message(&self, field: &str) -> String {
        match self {
            Constraint::Required => format!("{field} should not be empty"),
            Constraint::IsString => format!("{field} must be a string"),
            Constraint::MinLength(min) => {
                format!("{field} must be longer than or equal to {min} characters")
            }
            Constraint::MaxLength(max) => {
                format!("{field} must be shorter than or equal to {max} characters")
            }
            Constraint::Email => format!("{field} must be an email"),
            Constraint::Uuid => format!("{field} must be a UUID"),
            Constraint::DateString => format!("{field} must be a valid ISO 8601 date string"),
        }
    }
}

/// Constraints declared for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub constraints: &'static [Constraint],
}

impl FieldRules {
    /// A field without `Required` may be null.
    pub fn is_optional(&self) -> bool {
        !self.constraints.contains(&Constraint::Required)
    }

    /// Messages for every violated constraint, in declaration order.
    pub fn violations(&self, value: &Value) -> Vec<String> {
        if value.is_null() && self.is_optional() {
            return Vec::new();
        }
        self.constraints
            .iter()
            .filter(|constraint| !constraint.check(value))
            .map(|constraint| constraint.message(self.field))
            .collect()
    }
}
