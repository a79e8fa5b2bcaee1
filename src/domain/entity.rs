//! Entity base abstraction.
//!
//! An entity is a validated domain object: an immutable id, a shared
//! [`Notification`] and a static table of field constraints. Concrete
//! entities serialize their fields with serde and embed [`EntityBase`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::notification::{FieldError, Notification, NotificationError};
use super::rules::{Constraint, FieldRules};
use crate::config::ENTITY_ID_MAX_LENGTH;

/// Rules every entity inherits for its id.
const BASE_RULES: &[FieldRules] = &[FieldRules {
    field: "id",
    constraints: &[Constraint::IsString, Constraint::MaxLength(ENTITY_ID_MAX_LENGTH)],
}];

/// Identity and error sink shared by all entities.
#[derive(Debug, Clone, Serialize)]
pub struct EntityBase {
    id: String,
    #[serde(skip)]
    notification: Notification,
}

impl EntityBase {
    /// A missing or empty id is replaced by a fresh UUID v4.
    pub fn new(id: Option<String>, notification: Notification) -> Self {
        let id = id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self { id, notification }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }
}

/// Validation outcome for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldReport {
    Valid(Value),
    Invalid(FieldError<String>),
}

impl FieldReport {
    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldReport::Invalid(_))
    }

    pub fn value(&self) -> &Value {
        match self {
            FieldReport::Valid(value) => value,
            FieldReport::Invalid(error) => &error.value,
        }
    }
}

impl Serialize for FieldReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldReport::Valid(value) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("value", value)?;
                map.serialize_entry("invalid", &false)?;
                map.end()
            }
            FieldReport::Invalid(error) => error.serialize(serializer),
        }
    }
}

/// Per-field annotated output of [`Entity::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutput {
    fields: Vec<(String, FieldReport)>,
    validated: bool,
}

impl ValidationOutput {
    fn build(json: &Value, notification: &Notification) -> Self {
        let mut fields: Vec<(String, FieldReport)> = json
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .map(|(name, value)| (name.clone(), FieldReport::Valid(value.clone())))
                    .collect()
            })
            .unwrap_or_default();

        for (name, error) in notification.flat_message_errors().iter() {
            let report = FieldReport::Invalid(error.clone());
            match fields.iter_mut().find(|(field, _)| field == name) {
                Some((_, slot)) => *slot = report,
                None => fields.push((name.to_string(), report)),
            }
        }

        Self {
            fields,
            validated: notification.has_error(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldReport> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, report)| report)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldReport)> {
        self.fields.iter().map(|(name, report)| (name.as_str(), report))
    }

    /// Mirrors `Notification::has_error()` at the end of validation.
    pub fn validated(&self) -> bool {
        self.validated
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Serialize for ValidationOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (name, report) in &self.fields {
            map.serialize_entry(name, report)?;
        }
        map.serialize_entry("validated", &self.validated)?;
        map.end()
    }
}

/// A validated domain object.
pub trait Entity: Serialize + Clone + Send + Sync + Sized + 'static {
    /// Plain data the entity is constructed from.
    type Input: DeserializeOwned + Send;

    /// Type name used as the context of validation errors.
    const NAME: &'static str;

    /// Field constraints in reporting order.
    const RULES: &'static [FieldRules];

    /// Construct from plain data, sharing `notification` with the caller.
    fn build(input: Self::Input, notification: Notification) -> Self;

    fn base(&self) -> &EntityBase;

    /// Construct from a JSON data bag.
    fn from_value(data: Value, notification: Notification) -> Result<Self, NotificationError> {
        let input = serde_json::from_value(data).map_err(|e| {
            NotificationError::new(format!("{}: {}", Self::NAME, e))
                .with_code(StatusCode::UNPROCESSABLE_ENTITY)
        })?;
        Ok(Self::build(input, notification))
    }

    fn id(&self) -> &str {
        self.base().id()
    }

    fn notification(&self) -> &Notification {
        self.base().notification()
    }

    /// Check every declared constraint and record violations.
    ///
    /// Errors accumulate on the entity's notification; it is not cleared
    /// first, so validating twice on the same notification duplicates them.
    fn validate(&self) -> ValidationOutput {
        let json = self.to_json();
        let notification = self.notification();

        for rules in BASE_RULES.iter().chain(Self::RULES) {
            let value = json.get(rules.field).cloned().unwrap_or(Value::Null);
            for message in rules.violations(&value) {
                notification.add_error(rules.field, message, Self::NAME, value.clone());
            }
        }

        let output = ValidationOutput::build(&json, notification);
        if output.validated() {
            tracing::debug!(entity = Self::NAME, id = self.id(), "Entity failed validation");
        }
        output
    }

    /// Fail with a 422 error if the notification holds errors.
    ///
    /// Does not run validation itself.
    fn ensure_valid(&self) -> Result<(), NotificationError> {
        let notification = self.notification();
        if notification.has_error() {
            return Err(NotificationError::from_notification(
                notification,
                StatusCode::UNPROCESSABLE_ENTITY,
            ));
        }
        Ok(())
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Every field wrapped as `{ value }`.
    fn to_output(&self) -> Value {
        let output: Map<String, Value> = match self.to_json() {
            Value::Object(object) => object
                .into_iter()
                .map(|(name, value)| (name, json!({ "value": value })))
                .collect(),
            _ => Map::new(),
        };
        Value::Object(output)
    }

    /// Names of the fields (except `id`) holding a truthy value.
    fn filled_properties(&self) -> Vec<String> {
        match self.to_json() {
            Value::Object(object) => object
                .into_iter()
                .filter(|(name, value)| name != "id" && is_truthy(value))
                .map(|(name, _)| name)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Current time as an ISO 8601 string with millisecond precision.
pub fn timestamp_now() -> String {
    format_timestamp(&Utc::now())
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO 8601 date or date-time. Naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Normalize a parseable timestamp, keep anything else for validation to reject.
pub fn normalize_timestamp(value: String) -> String {
    match parse_timestamp(&value) {
        Some(timestamp) => format_timestamp(&timestamp),
        None => value,
    }
}
