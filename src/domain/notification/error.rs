//! Structured error raised when a notification carries errors.

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::{FieldErrors, Notification};

/// Error payload surfaced to callers: `{ code, message, errors }`.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct NotificationError {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors<String>>,
}

impl NotificationError {
    /// New error with the default 500 code and no field errors.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: message.into(),
            errors: None,
        }
    }

    /// Build from a notification: joined message plus flattened field errors.
    pub fn from_notification(notification: &Notification, code: StatusCode) -> Self {
        Self {
            code: code.as_u16(),
            message: notification.plain_message_errors(),
            errors: Some(notification.flat_message_errors()),
        }
    }

    pub fn with_code(mut self, code: StatusCode) -> Self {
        self.code = code.as_u16();
        self
    }

    pub fn with_errors(mut self, errors: FieldErrors<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
