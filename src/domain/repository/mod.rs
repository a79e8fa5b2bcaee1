//! Repository contract and the search/filter types it consumes.
//!
//! Use cases depend on persistence only through [`Repository`] and a
//! [`ConditionParser`]; both are injected so storage engines can be swapped.

use async_trait::async_trait;
use serde_json::Value;

use super::entity::Entity;
use super::notification::Notification;
use crate::errors::AppResult;

pub mod filter;
pub mod search_params;
pub mod search_result;

pub use filter::{
    Comparison, ConditionParser, FieldPredicate, Filter, FilterError, FilterNode, Literal,
    Operator, PassthroughParser,
};
pub use search_params::{IncludeConfig, SearchParams, SearchProps, SortDirection, SortParam};
pub use search_result::SearchResult;

/// Persistence operations over one entity type.
///
/// Writes validate first and never reach storage when the entity's
/// notification holds errors. Engine failures surface as
/// `AppError::Notification` carrying the engine's message.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Translated filter type this repository understands.
    type Filter: Clone + Send + Sync + 'static;

    /// Errors recorded by the repository itself (e.g. failed lookups).
    fn notification(&self) -> &Notification;

    /// Validate, then persist a new entity and return the stored state.
    async fn insert(&self, entity: E) -> AppResult<E>;

    /// Validate, then persist changes to an existing entity.
    async fn update(&self, entity: E) -> AppResult<E>;

    /// Delete by id. `Ok(false)` when nothing matched.
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// `Ok(None)` plus a notification error when no row matches.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<E>>;

    /// Filter, sort and paginate entities.
    async fn search(&self, params: SearchParams<Self::Filter>) -> AppResult<SearchResult<E>>;

    /// Like `search`, projecting rows onto `params.attributes()` when present.
    async fn search_rows(&self, params: SearchParams<Self::Filter>)
        -> AppResult<SearchResult<Value>>;

    /// Run a parameterized statement and return its rows as JSON objects.
    ///
    /// Bypasses entity validation. Placeholders follow the backend's syntax
    /// (`$1` for Postgres, `?` for SQLite).
    async fn execute_sql(&self, sql: &str, params: Vec<Value>) -> AppResult<Vec<Value>>;
}
