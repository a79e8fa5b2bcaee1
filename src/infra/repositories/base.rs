//! Generic SeaORM repository.
//!
//! One adapter serves every entity that describes its table mapping through
//! [`Persistable`].

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::sea_query::Order;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, JsonValue, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Statement,
};
use serde_json::{json, Value};

use super::condition::resolve_column;
use crate::config::REPOSITORY_CONTEXT;
use crate::domain::notification::{Notification, NotificationError};
use crate::domain::repository::{Repository, SearchParams, SearchResult, SortDirection};
use crate::domain::Entity;
use crate::errors::{AppError, AppResult};

/// Mapping between a domain entity and its SeaORM table.
pub trait Persistable: Entity {
    type Table: EntityTrait<Model = Self::Model>;
    type Model: FromQueryResult + IntoActiveModel<Self::ActiveModel> + Send + Sync + 'static;
    type ActiveModel: ActiveModelTrait<Entity = Self::Table> + ActiveModelBehavior + Send + 'static;

    /// Column holding the entity id.
    fn primary_column() -> <Self::Table as EntityTrait>::Column;

    /// Hydrate a stored row.
    fn from_model(model: Self::Model, notification: Notification) -> Self;

    /// Full active model with every column set.
    fn to_active_model(&self) -> AppResult<Self::ActiveModel>;
}

/// [`Repository`] implementation over a SeaORM connection.
pub struct SeaOrmRepository<E> {
    db: DatabaseConnection,
    notification: Notification,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Persistable> SeaOrmRepository<E> {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            notification: Notification::new(),
            _entity: PhantomData,
        }
    }

    /// Get database connection reference
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn filtered(&self, params: &SearchParams<Condition>) -> Select<E::Table> {
        if !params.include().is_empty() {
            tracing::warn!(
                entity = E::NAME,
                relations = params.include().len(),
                "Relation inclusion is not supported, ignoring"
            );
        }
        let query = E::Table::find();
        match params.filter() {
            Some(condition) => query.filter(condition.clone()),
            None => query,
        }
    }

    fn ordered_page(
        mut query: Select<E::Table>,
        params: &SearchParams<Condition>,
    ) -> AppResult<Select<E::Table>> {
        if let Some(sort) = params.sort() {
            for (field, direction) in sort.iter() {
                let column = resolve_column::<E::Table>(field)?;
                let order = match direction {
                    SortDirection::Asc => Order::Asc,
                    SortDirection::Desc => Order::Desc,
                };
                query = query.order_by(column, order);
            }
        }
        Ok(query.offset(params.skip()).limit(params.take()))
    }

    fn hydrate(model: E::Model) -> E {
        E::from_model(model, Notification::new())
    }
}

/// Re-signal an engine failure as a notification error with its message.
fn engine_error(operation: &'static str, err: DbErr) -> AppError {
    tracing::error!(operation, error = %err, "Persistence operation failed");
    AppError::Notification(NotificationError::new(err.to_string()))
}

/// Bind a JSON parameter as a SQL value.
fn bind_value(value: &Value) -> sea_orm::Value {
    match value {
        Value::Null => sea_orm::Value::String(None),
        Value::Bool(b) => (*b).into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().into(),
        },
        Value::String(s) => s.clone().into(),
        other => other.clone().into(),
    }
}

#[async_trait]
impl<E: Persistable> Repository<E> for SeaOrmRepository<E> {
    type Filter = Condition;

    fn notification(&self) -> &Notification {
        &self.notification
    }

    async fn insert(&self, entity: E) -> AppResult<E> {
        entity.validate();
        entity.ensure_valid()?;

        let model = entity
            .to_active_model()?
            .insert(&self.db)
            .await
            .map_err(|e| engine_error("insert", e))?;

        tracing::debug!(entity = E::NAME, id = entity.id(), "Entity inserted");
        Ok(E::from_model(model, entity.notification().clone()))
    }

    async fn update(&self, entity: E) -> AppResult<E> {
        entity.validate();
        entity.ensure_valid()?;

        let model = entity
            .to_active_model()?
            .update(&self.db)
            .await
            .map_err(|e| engine_error("update", e))?;

        tracing::debug!(entity = E::NAME, id = entity.id(), "Entity updated");
        Ok(E::from_model(model, entity.notification().clone()))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        if id.trim().is_empty() {
            return Err(AppError::bad_request("id is required"));
        }

        let result = E::Table::delete_many()
            .filter(E::primary_column().eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| engine_error("delete", e))?;

        tracing::debug!(entity = E::NAME, id, rows = result.rows_affected, "Delete executed");
        Ok(result.rows_affected > 0)
    }

    /// Clears the repository notification first, so it only reports the latest lookup.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<E>> {
        self.notification.clear_errors();
        let model = E::Table::find()
            .filter(E::primary_column().eq(id))
            .one(&self.db)
            .await
            .map_err(|e| engine_error("find_by_id", e))?;

        match model {
            Some(model) => Ok(Some(Self::hydrate(model))),
            None => {
                self.notification
                    .add_error("id", "Could not find by id", REPOSITORY_CONTEXT, json!(id));
                Ok(None)
            }
        }
    }

    async fn search(&self, params: SearchParams<Condition>) -> AppResult<SearchResult<E>> {
        let query = self.filtered(&params);
        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| engine_error("search", e))?;

        let items = Self::ordered_page(query, &params)?
            .all(&self.db)
            .await
            .map_err(|e| engine_error("search", e))?
            .into_iter()
            .map(Self::hydrate)
            .collect();

        Ok(SearchResult::from_params(items, total, &params))
    }

    async fn search_rows(&self, params: SearchParams<Condition>) -> AppResult<SearchResult<Value>> {
        if params.attributes().is_empty() {
            return Ok(self.search(params).await?.map(|entity| entity.to_json()));
        }

        let query = self.filtered(&params);
        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| engine_error("search", e))?;

        let mut projected = query.select_only();
        for attribute in params.attributes() {
            let column = resolve_column::<E::Table>(attribute)?;
            projected = projected.column_as(column, attribute.as_str());
        }

        let rows = Self::ordered_page(projected, &params)?
            .into_json()
            .all(&self.db)
            .await
            .map_err(|e| engine_error("search", e))?;

        Ok(SearchResult::from_params(rows, total, &params))
    }

    async fn execute_sql(&self, sql: &str, params: Vec<Value>) -> AppResult<Vec<Value>> {
        let statement = Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            params.iter().map(bind_value),
        );

        tracing::debug!(entity = E::NAME, sql, "Executing raw statement");
        JsonValue::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(|e| engine_error("execute_sql", e))
    }
}
