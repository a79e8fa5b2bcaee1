//! Authentication service - Handles sign-up and credential checks.
//!
//! Passwords are hashed and verified through the domain `Password` value
//! object. Token issuance is left to the caller.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::presenter::data_to_entity;
use crate::domain::repository::{ConditionParser, Repository, SearchParams, SearchProps};
use crate::domain::{Entity, SignInEntity, UserEntity};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user; the email must not be taken
    async fn sign_up(&self, data: Value) -> AppResult<Value>;

    /// Check credentials and return the matching user
    async fn sign_in(&self, data: Value) -> AppResult<Value>;
}

/// Concrete implementation of AuthService over the user repository.
pub struct Authenticator<R: Repository<UserEntity>> {
    repo: Arc<R>,
    parser: Arc<dyn ConditionParser<Output = R::Filter>>,
}

impl<R: Repository<UserEntity>> Authenticator<R> {
    /// Create new auth service instance
    pub fn new(repo: Arc<R>, parser: Arc<dyn ConditionParser<Output = R::Filter>>) -> Self {
        Self { repo, parser }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserEntity>> {
        let props = SearchProps {
            filter: json!([{ "email": email }]),
            per_page: json!(1),
            ..SearchProps::default()
        };
        let params = SearchParams::new(props, self.parser.as_ref())?;
        let result = self.repo.search(params).await?;
        Ok(result.into_items().into_iter().next())
    }
}

#[async_trait]
impl<R: Repository<UserEntity>> AuthService for Authenticator<R> {
    async fn sign_up(&self, data: Value) -> AppResult<Value> {
        let mut user: UserEntity = data_to_entity(data)?;
        user.ensure_valid()?;

        let email = user.email.clone().unwrap_or_default();
        if self.find_by_email(&email).await?.is_some() {
            tracing::warn!(email = %email, "Sign-up rejected, email already registered");
            return Err(AppError::conflict("User"));
        }

        user.hash_password()?;
        let stored = self.repo.insert(user).await?;
        tracing::info!(user_id = stored.id(), "User signed up");
        Ok(stored.to_public_json())
    }

    async fn sign_in(&self, data: Value) -> AppResult<Value> {
        let credentials: SignInEntity = data_to_entity(data)?;
        credentials.ensure_valid()?;

        let email = credentials.email.as_deref().unwrap_or_default();
        let password = credentials.password.as_deref().unwrap_or_default();

        let Some(user) = self.find_by_email(email).await? else {
            tracing::warn!(email, "Sign-in rejected, email not registered");
            return Err(AppError::bad_request("Email not registered"));
        };

        if !user.verify_password(password) {
            tracing::warn!(user_id = user.id(), "Sign-in rejected, wrong password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id(), "User signed in");
        Ok(user.to_public_json())
    }
}
