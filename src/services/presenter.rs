//! Conversions between plain data and entities.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::entity::format_timestamp;
use crate::domain::{Entity, Notification, NotificationError};

/// Build an entity on a fresh notification and validate it.
///
/// Validation problems stay on the entity's notification; only data that
/// cannot be deserialized into the entity's input fails here.
pub fn data_to_entity<E: Entity>(data: Value) -> Result<E, NotificationError> {
    let entity = E::from_value(data, Notification::new())?;
    entity.validate();
    Ok(entity)
}

pub fn entity_to_data<E: Entity>(entity: &E) -> Value {
    entity.to_json()
}

/// Tree-shaped value with timestamps tagged explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum PlainValue {
    Scalar(Value),
    Timestamp(DateTime<Utc>),
    List(Vec<PlainValue>),
    Map(Vec<(String, PlainValue)>),
}

impl From<Value> for PlainValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(object) => Self::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            scalar => Self::Scalar(scalar),
        }
    }
}

impl From<DateTime<Utc>> for PlainValue {
    fn from(timestamp: DateTime<Utc>) -> Self {
        Self::Timestamp(timestamp)
    }
}

/// Flatten nested maps and lists into one map with dotted keys.
///
/// List elements are keyed by index. Timestamps are leaves and are rendered
/// as ISO 8601 strings. Empty containers contribute no keys.
pub fn flat_object(input: &PlainValue) -> Map<String, Value> {
    let mut output = Map::new();
    flatten_into(input, None, &mut output);
    output
}

fn flatten_into(input: &PlainValue, reference: Option<&str>, output: &mut Map<String, Value>) {
    let key_for = |key: &str| match reference {
        Some(prefix) => format!("{prefix}.{key}"),
        None => key.to_string(),
    };

    match input {
        PlainValue::Map(entries) => {
            for (key, value) in entries {
                flatten_entry(value, key_for(key), output);
            }
        }
        PlainValue::List(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_entry(value, key_for(&index.to_string()), output);
            }
        }
        // a bare leaf has no key to be stored under
        PlainValue::Scalar(_) | PlainValue::Timestamp(_) => {}
    }
}

fn flatten_entry(value: &PlainValue, key: String, output: &mut Map<String, Value>) {
    match value {
        PlainValue::Scalar(scalar) => {
            output.insert(key, scalar.clone());
        }
        PlainValue::Timestamp(timestamp) => {
            output.insert(key, Value::String(format_timestamp(timestamp)));
        }
        nested => flatten_into(nested, Some(&key), output),
    }
}
