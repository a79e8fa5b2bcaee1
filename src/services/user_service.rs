//! User service - Handles user-related use cases.
//!
//! Depends on persistence only through the `Repository` contract and an
//! injected `ConditionParser`, so any storage engine can back it.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::presenter::data_to_entity;
use crate::domain::repository::{ConditionParser, Repository, SearchParams, SearchProps, SearchResult};
use crate::domain::user::strip_sensitive;
use crate::domain::{Entity, UserEntity};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
///
/// Results are plain JSON with credentials removed.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Validate and store a new user
    async fn create_user(&self, data: Value) -> AppResult<Value>;

    /// Merge `patch` over the stored user, then validate and store it
    async fn update_user(&self, id: &str, patch: Value) -> AppResult<Value>;

    /// Delete a user. `false` when nothing matched
    async fn delete_user(&self, id: &str) -> AppResult<bool>;

    /// Get user by ID
    async fn find_user(&self, id: &str) -> AppResult<Value>;

    /// Filter, sort and paginate users
    async fn search_users(&self, props: SearchProps) -> AppResult<SearchResult<Value>>;
}

/// Concrete implementation of UserService over a repository.
pub struct UserManager<R: Repository<UserEntity>> {
    repo: Arc<R>,
    parser: Arc<dyn ConditionParser<Output = R::Filter>>,
}

impl<R: Repository<UserEntity>> UserManager<R> {
    /// Create new user service instance
    pub fn new(repo: Arc<R>, parser: Arc<dyn ConditionParser<Output = R::Filter>>) -> Self {
        Self { repo, parser }
    }
}

/// Build a user from plain data, failing with 422 when it does not validate.
fn valid_user(data: Value) -> AppResult<UserEntity> {
    let user: UserEntity = data_to_entity(data)?;
    user.ensure_valid()?;
    Ok(user)
}

#[async_trait]
impl<R: Repository<UserEntity>> UserService for UserManager<R> {
    async fn create_user(&self, data: Value) -> AppResult<Value> {
        let mut user = valid_user(data)?;
        user.hash_password()?;

        let stored = self.repo.insert(user).await?;
        tracing::info!(user_id = stored.id(), "User created");
        Ok(stored.to_public_json())
    }

    async fn update_user(&self, id: &str, patch: Value) -> AppResult<Value> {
        let Value::Object(patch) = patch else {
            return Err(AppError::bad_request("update data must be an object"));
        };

        let existing = self.repo.find_by_id(id).await?.ok_or_not_found()?;
        let mut merged = existing.to_json();
        let rehash = patch.get("password").is_some_and(|p| !p.is_null());
        if let Value::Object(target) = &mut merged {
            for (key, value) in patch {
                // id is fixed by the path
                if key != "id" {
                    target.insert(key, value);
                }
            }
        }

        let mut user = valid_user(merged)?;
        if rehash {
            user.hash_password()?;
        }

        let stored = self.repo.update(user).await?;
        tracing::info!(user_id = stored.id(), "User updated");
        Ok(stored.to_public_json())
    }

    async fn delete_user(&self, id: &str) -> AppResult<bool> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            tracing::info!(user_id = id, "User deleted");
        }
        Ok(deleted)
    }

    async fn find_user(&self, id: &str) -> AppResult<Value> {
        let user = self.repo.find_by_id(id).await?.ok_or_not_found()?;
        Ok(user.to_public_json())
    }

    async fn search_users(&self, mut props: SearchProps) -> AppResult<SearchResult<Value>> {
        props.include.clear();
        let params = SearchParams::new(props, self.parser.as_ref())?;
        let result = self.repo.search_rows(params).await?;
        Ok(result.map(strip_sensitive))
    }
}
