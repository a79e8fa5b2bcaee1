//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod auth;
pub mod migrate;
pub mod users;

use std::sync::Arc;

use sea_orm::Condition;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::domain::ConditionParser;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, SeaOrmConditionParser, UserStore, UserTable};

/// Connect, apply migrations and build the user repository with its parser.
async fn user_store(
    config: &Config,
) -> AppResult<(Arc<UserStore>, Arc<dyn ConditionParser<Output = Condition>>)> {
    let db = Database::connect(config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let store = Arc::new(UserStore::new(db.get_connection()));
    let parser: Arc<dyn ConditionParser<Output = Condition>> =
        Arc::new(SeaOrmConditionParser::<UserTable>::new());
    Ok((store, parser))
}

/// Parse a JSON command-line argument.
fn json_arg(name: &str, raw: &str) -> AppResult<Value> {
    serde_json::from_str(raw).map_err(|e| AppError::bad_request(format!("{name} is not valid JSON: {e}")))
}

/// Scalar option as JSON; unparseable text stays a string.
fn scalar_arg(raw: Option<String>) -> Value {
    match raw {
        Some(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        None => Value::Null,
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("Failed to render output: {}", e)))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_arg() {
        assert_eq!(scalar_arg(Some("2".to_string())), json!(2));
        assert_eq!(scalar_arg(Some("abc".to_string())), json!("abc"));
        assert_eq!(scalar_arg(None), Value::Null);
    }

    #[test]
    fn test_json_arg_reports_name() {
        let error = json_arg("filter", "[{").unwrap_err();
        assert!(error.to_string().starts_with("filter is not valid JSON"));
    }
}
