//! Sign-in credentials entity.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityBase};
use super::notification::Notification;
use super::rules::{Constraint, FieldRules};
use crate::config::MAX_TEXT_LENGTH;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Credentials submitted for sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct SignInEntity {
    #[serde(flatten)]
    base: EntityBase,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Entity for SignInEntity {
    type Input = SignInInput;

    const NAME: &'static str = "SignInEntity";

    const RULES: &'static [FieldRules] = &[
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
                Constraint::MaxLength(MAX_TEXT_LENGTH),
            ],
        },
    ];

    fn build(input: SignInInput, notification: Notification) -> Self {
        Self {
            base: EntityBase::new(None, notification),
            email: input.email,
            password: input.password,
        }
    }

    fn base(&self) -> &EntityBase {
        &self.base
    }
}
