//! Notification - per-operation error accumulator keyed by field.
//!
//! A `Notification` is a cheap handle: clones share the same error map, so an
//! entity and the code that created it observe the same errors. Create a new
//! one with [`Notification::new`] for every independent validation scope.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

mod error;

pub use error::NotificationError;

/// Errors recorded for one field.
///
/// `M` is the message representation: `Vec<String>` while accumulating,
/// `String` once flattened for payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError<M> {
    pub messages: M,
    pub context: String,
    pub value: Value,
    pub invalid: bool,
}

impl FieldError<Vec<String>> {
    fn flatten(&self) -> FieldError<String> {
        FieldError {
            messages: self.messages.join(", "),
            context: self.context.clone(),
            value: self.value.clone(),
            invalid: self.invalid,
        }
    }
}

/// Field errors in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors<M> {
    entries: Vec<(String, FieldError<M>)>,
}

impl<M> Default for FieldErrors<M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<M> FieldErrors<M> {
    pub fn get(&self, field: &str) -> Option<&FieldError<M>> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, error)| error)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError<M>)> {
        self.entries
            .iter()
            .map(|(name, error)| (name.as_str(), error))
    }

    /// Field names in the order their first error was recorded.
    pub fn fields(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl<M: Serialize> Serialize for FieldErrors<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, error) in &self.entries {
            map.serialize_entry(field, error)?;
        }
        map.end()
    }
}

/// Shared, mutable error accumulator.
#[derive(Debug, Clone, Default)]
pub struct Notification {
    inner: Arc<Mutex<FieldErrors<Vec<String>>>>,
}

impl Notification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `target`.
    ///
    /// Repeated errors for the same field append to its message list in call
    /// order; `context` and `value` always reflect the latest call.
    pub fn add_error(
        &self,
        target: impl Into<String>,
        message: impl Into<String>,
        context: impl Into<String>,
        value: Value,
    ) {
        let target = target.into();
        let message = message.into();
        let context = context.into();
        let mut errors = self.lock();

        match errors.entries.iter_mut().find(|(name, _)| *name == target) {
            Some((_, entry)) => {
                entry.messages.push(message);
                entry.context = context;
                entry.value = value;
            }
            None => errors.entries.push((
                target,
                FieldError {
                    messages: vec![message],
                    context,
                    value,
                    invalid: true,
                },
            )),
        }
    }

    pub fn has_error(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Snapshot of the raw error map.
    pub fn errors(&self) -> FieldErrors<Vec<String>> {
        self.lock().clone()
    }

    /// Snapshot with each field's messages joined by ", ".
    pub fn flat_message_errors(&self) -> FieldErrors<String> {
        let errors = self.lock();
        FieldErrors {
            entries: errors
                .entries
                .iter()
                .map(|(name, error)| (name.clone(), error.flatten()))
                .collect(),
        }
    }

    /// All messages of all fields as one human readable string.
    pub fn plain_message_errors(&self) -> String {
        self.flat_message_errors()
            .entries
            .into_iter()
            .map(|(_, error)| error.messages)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn clear_errors(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, FieldErrors<Vec<String>>> {
        // No code path panics while holding the guard, so the data is intact.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_error_creates_entry() {
        let notification = Notification::new();
        notification.add_error("name", "name is required", "UserEntity", Value::Null);

        assert!(notification.has_error());
        let errors = notification.errors();
        let name = errors.get("name").unwrap();
        assert_eq!(name.messages, vec!["name is required".to_string()]);
        assert_eq!(name.context, "UserEntity");
        assert!(name.invalid);
    }

    #[test]
    fn test_repeated_errors_append_in_order() {
        let notification = Notification::new();
        notification.add_error("name", "first", "A", json!(1));
        notification.add_error("name", "second", "B", json!(2));
        notification.add_error("name", "second", "B", json!(2));

        let errors = notification.errors();
        assert_eq!(errors.len(), 1);
        let name = errors.get("name").unwrap();
        assert_eq!(name.messages, vec!["first", "second", "second"]);
        assert_eq!(name.context, "B");
        assert_eq!(name.value, json!(2));
    }

    #[test]
    fn test_flat_and_plain_messages() {
        let notification = Notification::new();
        notification.add_error("name", "too short", "UserEntity", json!("J"));
        notification.add_error("email", "invalid email", "UserEntity", json!("x"));
        notification.add_error("name", "must be a string", "UserEntity", json!("J"));

        let flat = notification.flat_message_errors();
        assert_eq!(flat.fields(), vec!["name", "email"]);
        assert_eq!(flat.get("name").unwrap().messages, "too short, must be a string");
        assert_eq!(
            notification.plain_message_errors(),
            "too short, must be a string, invalid email"
        );
    }

    #[test]
    fn test_flat_errors_serialize_as_map() {
        let notification = Notification::new();
        notification.add_error("email", "invalid email", "UserEntity", json!("x"));

        let value = serde_json::to_value(notification.flat_message_errors()).unwrap();
        assert_eq!(
            value,
            json!({
                "email": {
                    "messages": "invalid email",
                    "context": "UserEntity",
                    "value": "x",
                    "invalid": true
                }
            })
        );
    }

    #[test]
    fn test_clones_share_state_and_clear() {
        let notification = Notification::new();
        let shared = notification.clone();
        shared.add_error("id", "Could not find by id", "SeaOrmRepository", json!("42"));

        assert!(notification.has_error());
        notification.clear_errors();
        assert!(!shared.has_error());
        assert_eq!(shared.plain_message_errors(), "");
    }

    #[test]
    fn test_new_notifications_are_independent() {
        let first = Notification::new();
        let second = Notification::new();
        first.add_error("name", "required", "UserEntity", Value::Null);

        assert!(!second.has_error());
    }
}
