//! User domain entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{normalize_timestamp, timestamp_now, Entity, EntityBase};
use super::notification::Notification;
use super::password::Password;
use super::rules::{Constraint, FieldRules};
use crate::config::{MAX_TEXT_LENGTH, MAX_TOKEN_LENGTH, MIN_PASSWORD_LENGTH};
use crate::errors::AppResult;

/// Fields never echoed back to callers.
pub const SENSITIVE_FIELDS: &[&str] = &["password", "refreshToken"];

/// Plain data a user is built from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub refresh_token: Option<String>,
    pub refresh_token_expiration: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// User domain entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    #[serde(flatten)]
    base: EntityBase,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub refresh_token: Option<String>,
    pub refresh_token_expiration: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Entity for UserEntity {
    type Input = UserInput;

    const NAME: &'static str = "UserEntity";

    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "id",
            constraints: &[Constraint::Uuid],
        },
        FieldRules {
            field: "name",
            constraints: &[
                Constraint::Required,
                Constraint::IsString,
                Constraint::MaxLength(MAX_TEXT_LENGTH),
            ],
        },
        FieldRules {
            field: "email",
            constraints: &[
                Constraint::Required,
                Constraint::IsString,
                Constraint::Email,
                Constraint::MaxLength(MAX_TEXT_LENGTH),
            ],
        },
        FieldRules {
            field: "password",
            constraints: &[
                Constraint::Required,
                Constraint::IsString,
                Constraint::MinLength(MIN_PASSWORD_LENGTH),
                Constraint::MaxLength(MAX_TEXT_LENGTH),
            ],
        },
        FieldRules {
            field: "refreshToken",
            constraints: &[Constraint::IsString, Constraint::MaxLength(MAX_TOKEN_LENGTH)],
        },
        FieldRules {
            field: "refreshTokenExpiration",
            constraints: &[Constraint::DateString],
        },
        FieldRules {
            field: "createdAt",
            constraints: &[Constraint::Required, Constraint::DateString],
        },
        FieldRules {
            field: "updatedAt",
            constraints: &[Constraint::DateString],
        },
    ];

    /// `createdAt` defaults to now; `updatedAt` is always stamped with now.
    fn build(input: UserInput, notification: Notification) -> Self {
        Self {
            base: EntityBase::new(input.id, notification),
            name: input.name,
            email: input.email,
            password: input.password,
            refresh_token: input.refresh_token,
            refresh_token_expiration: input.refresh_token_expiration.map(normalize_timestamp),
            created_at: input
                .created_at
                .map(normalize_timestamp)
                .unwrap_or_else(timestamp_now),
            updated_at: Some(timestamp_now()),
        }
    }

    fn base(&self) -> &EntityBase {
        &self.base
    }
}

impl UserEntity {
    /// Replace the plain text password with its Argon2 hash.
    pub fn hash_password(&mut self) -> AppResult<()> {
        if let Some(plain) = self.password.as_deref() {
            self.password = Some(Password::new(plain)?.into_string());
        }
        Ok(())
    }

    /// Check a plain text candidate against the stored hash.
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password
            .as_deref()
            .is_some_and(|hash| Password::from_hash(hash).verify(candidate))
    }

    /// JSON projection without credentials.
    pub fn to_public_json(&self) -> Value {
        strip_sensitive(self.to_json())
    }
}

/// Remove credential fields from a JSON object.
pub fn strip_sensitive(mut value: Value) -> Value {
    if let Value::Object(object) = &mut value {
        for field in SENSITIVE_FIELDS {
            object.remove(*field);
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(data: Value) -> UserEntity {
        UserEntity::from_value(data, Notification::new()).unwrap()
    }

    #[test]
    fn test_valid_user() {
        let entity = user(json!({
            "name": "John",
            "email": "john@example.com",
            "password": "secret-password"
        }));
        let output = entity.validate();

        assert!(!entity.notification().has_error());
        assert!(!output.validated());
        assert!(entity.updated_at.is_some());
        assert_eq!(
            entity.filled_properties(),
            vec!["name", "email", "password", "createdAt", "updatedAt"]
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let entity = user(json!({ "email": "john@example.com" }));
        entity.validate();

        let errors = entity.notification().errors();
        assert_eq!(errors.fields(), vec!["name", "password"]);
        assert_eq!(
            errors.get("name").unwrap().messages,
            vec!["name should not be empty", "name must be a string"]
        );
    }

    #[test]
    fn test_invalid_formats() {
        let entity = user(json!({
            "id": "not-a-uuid",
            "name": "John",
            "email": "john",
            "password": "short",
            "createdAt": "someday"
        }));
        entity.validate();

        let errors = entity.notification().flat_message_errors();
        assert_eq!(errors.fields(), vec!["id", "email", "password", "createdAt"]);
        assert_eq!(errors.get("id").unwrap().messages, "id must be a UUID");
        assert_eq!(errors.get("createdAt").unwrap().value, json!("someday"));
    }

    #[test]
    fn test_created_at_is_normalized() {
        let entity = user(json!({ "createdAt": "2022-10-10" }));
        assert_eq!(entity.created_at, "2022-10-10T00:00:00.000Z");
    }

    #[test]
    fn test_hash_and_verify_password() {
        let mut entity = user(json!({ "password": "secret-password" }));
        entity.hash_password().unwrap();

        assert_ne!(entity.password.as_deref(), Some("secret-password"));
        assert!(entity.verify_password("secret-password"));
        assert!(!entity.verify_password("other-password"));
    }

    #[test]
    fn test_public_json_hides_credentials() {
        let entity = user(json!({
            "name": "John",
            "password": "secret-password",
            "refreshToken": "token"
        }));
        let public = entity.to_public_json();

        assert!(public.get("password").is_none());
        assert!(public.get("refreshToken").is_none());
        assert_eq!(public["name"], json!("John"));
    }
}
