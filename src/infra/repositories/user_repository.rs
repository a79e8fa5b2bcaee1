//! User persistence over the `users` table.

use chrono::{DateTime, Utc};
use sea_orm::Set;

use super::base::{Persistable, SeaOrmRepository};
use super::entities::user::Column;
use super::entities::{UserActiveModel, UserModel, UserTable};
use crate::domain::entity::{format_timestamp, parse_timestamp};
use crate::domain::{Entity, Notification, UserEntity, UserInput};
use crate::errors::{AppError, AppResult};

/// Repository for [`UserEntity`].
pub type UserStore = SeaOrmRepository<UserEntity>;

impl Persistable for UserEntity {
    type Table = UserTable;
    type Model = UserModel;
    type ActiveModel = UserActiveModel;

    fn primary_column() -> Column {
        Column::Id
    }

    fn from_model(model: UserModel, notification: Notification) -> Self {
        let input = UserInput {
            id: Some(model.id),
            name: Some(model.name),
            email: Some(model.email),
            password: Some(model.password),
            refresh_token: model.refresh_token,
            refresh_token_expiration: model.refresh_token_expiration.as_ref().map(format_timestamp),
            created_at: Some(format_timestamp(&model.created_at)),
            updated_at: None,
        };
        let mut user = UserEntity::build(input, notification);
        // build() stamps updatedAt with now; keep the stored value
        user.updated_at = model.updated_at.as_ref().map(format_timestamp);
        user
    }

    fn to_active_model(&self) -> AppResult<UserActiveModel> {
        Ok(UserActiveModel {
            id: Set(self.id().to_string()),
            name: Set(self.name.clone().unwrap_or_default()),
            email: Set(self.email.clone().unwrap_or_default()),
            password: Set(self.password.clone().unwrap_or_default()),
            refresh_token: Set(self.refresh_token.clone()),
            refresh_token_expiration: Set(optional_timestamp(
                "refreshTokenExpiration",
                self.refresh_token_expiration.as_deref(),
            )?),
            created_at: Set(timestamp("createdAt", &self.created_at)?),
            updated_at: Set(optional_timestamp("updatedAt", self.updated_at.as_deref())?),
        })
    }
}

fn timestamp(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    parse_timestamp(value)
        .ok_or_else(|| AppError::bad_request(format!("{field} must be a valid ISO 8601 date string")))
}

fn optional_timestamp(field: &str, value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    value.map(|v| timestamp(field, v)).transpose()
}
