//! Filter AST -> SeaORM `Condition` translation.

use std::fmt;
use std::marker::PhantomData;

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, IdenStatic, Iterable};

use crate::domain::repository::{
    Comparison, ConditionParser, FieldPredicate, Filter, FilterError, FilterNode, Literal,
};

/// Translates filters against the columns of table `T`.
///
/// Field names are matched against column names after camelCase to
/// snake_case conversion, so `createdAt` resolves to `created_at`.
pub struct SeaOrmConditionParser<T> {
    _table: PhantomData<fn() -> T>,
}

impl<T> SeaOrmConditionParser<T> {
    pub fn new() -> Self {
        Self {
            _table: PhantomData,
        }
    }
}

impl<T> Default for SeaOrmConditionParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SeaOrmConditionParser<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SeaOrmConditionParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeaOrmConditionParser")
            .field("table", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: EntityTrait> ConditionParser for SeaOrmConditionParser<T> {
    type Output = Condition;

    fn translate(&self, filter: &Filter) -> Result<Condition, FilterError> {
        // no groups means no constraint, not an empty OR
        if filter.is_empty() {
            return Ok(Condition::all());
        }
        filter.groups().iter().try_fold(Condition::any(), |condition, node| {
            Ok(condition.add(node_condition::<T>(node)?))
        })
    }
}

fn node_condition<T: EntityTrait>(node: &FilterNode) -> Result<Condition, FilterError> {
    match node {
        FilterNode::All(predicates) => predicates.iter().try_fold(Condition::all(), |condition, p| {
            Ok(condition.add(predicate_expr::<T>(p)?))
        }),
        FilterNode::Any(nodes) => nodes.iter().try_fold(Condition::any(), |condition, node| {
            Ok(condition.add(node_condition::<T>(node)?))
        }),
    }
}

fn predicate_expr<T: EntityTrait>(predicate: &FieldPredicate) -> Result<SimpleExpr, FilterError> {
    let column = resolve_column::<T>(&predicate.field)?;
    Ok(match &predicate.comparison {
        // `= NULL` never matches in SQL
        Comparison::Eq(Literal::Null) | Comparison::IsNull => column.is_null(),
        Comparison::Ne(Literal::Null) | Comparison::NotNull => column.is_not_null(),
        Comparison::Eq(value) => column.eq(sea_value(value)),
        Comparison::Ne(value) => column.ne(sea_value(value)),
        Comparison::Lt(value) => column.lt(sea_value(value)),
        Comparison::Lte(value) => column.lte(sea_value(value)),
        Comparison::Gt(value) => column.gt(sea_value(value)),
        Comparison::Gte(value) => column.gte(sea_value(value)),
        Comparison::In(values) => column.is_in(values.iter().map(sea_value)),
        Comparison::NotIn(values) => column.is_not_in(values.iter().map(sea_value)),
        Comparison::Contains(text) => lower(column).like(pattern(format!("%{}%", like_escape(text)))),
        Comparison::NotContains(text) => {
            lower(column).not_like(pattern(format!("%{}%", like_escape(text))))
        }
        Comparison::StartsWith(text) => lower(column).like(pattern(format!("{}%", like_escape(text)))),
        Comparison::EndsWith(text) => lower(column).like(pattern(format!("%{}", like_escape(text)))),
        Comparison::Between(from, to) => column.between(sea_value(from), sea_value(to)),
    })
}

/// Find the column of `T` named by a (camelCase or snake_case) field.
pub fn resolve_column<T: EntityTrait>(field: &str) -> Result<T::Column, FilterError> {
    let name = to_snake_case(field);
    T::Column::iter()
        .find(|column| column.as_str() == name)
        .ok_or_else(|| FilterError::UnknownField(field.to_string()))
}

fn to_snake_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn lower<C: ColumnTrait>(column: C) -> Expr {
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
}

fn pattern(pattern: String) -> LikeExpr {
    LikeExpr::new(pattern.to_lowercase()).escape('\\')
}

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn sea_value(literal: &Literal) -> sea_orm::Value {
    match literal {
        Literal::Null => sea_orm::Value::String(None),
        Literal::Bool(b) => (*b).into(),
        Literal::Int(i) => (*i).into(),
        Literal::Float(x) => (*x).into(),
        Literal::Text(s) => s.clone().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::entities::UserTable;
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};
    use serde_json::{json, Value};

    fn sql(filter: Value) -> String {
        let condition = SeaOrmConditionParser::<UserTable>::new()
            .parse(&filter)
            .unwrap();
        UserTable::find()
            .filter(condition)
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_equality_forms_are_equivalent() {
        let implicit = sql(json!([{ "email": "john@example.com" }]));
        let explicit = sql(json!([{ "email": { "$eq": "john@example.com" } }]));

        assert_eq!(implicit, explicit);
        assert!(implicit.contains(r#""users"."email" = 'john@example.com'"#));
    }

    #[test]
    fn test_comparisons() {
        assert!(sql(json!([{ "name": { "$ne": "maria" } }])).contains(r#""users"."name" <> 'maria'"#));
        assert!(sql(json!([{ "name": { "$gt": 5 } }])).contains(r#""users"."name" > 5"#));
        assert!(sql(json!([{ "name": { "$gte": 5 } }])).contains(r#""users"."name" >= 5"#));
        assert!(sql(json!([{ "name": { "$lt": 5 } }])).contains(r#""users"."name" < 5"#));
        assert!(sql(json!([{ "name": { "$lte": 5 } }])).contains(r#""users"."name" <= 5"#));
    }

    #[test]
    fn test_between_is_inclusive_range() {
        let query = sql(json!([{ "createdAt": { "$between": ["2022-10-10", "2022-10-11"] } }]));
        assert!(query.contains(r#""users"."created_at" BETWEEN '2022-10-10' AND '2022-10-11'"#));
    }

    #[test]
    fn test_membership() {
        assert!(sql(json!([{ "name": { "$in": ["a", "b"] } }]))
            .contains(r#""users"."name" IN ('a', 'b')"#));
        assert!(sql(json!([{ "name": { "$notin": ["a"] } }]))
            .contains(r#""users"."name" NOT IN ('a')"#));
    }

    #[test]
    fn test_null_checks() {
        assert!(sql(json!([{ "refreshToken": { "$isnull": true } }]))
            .contains(r#""users"."refresh_token" IS NULL"#));
        assert!(sql(json!([{ "refreshToken": { "$notnull": true } }]))
            .contains(r#""users"."refresh_token" IS NOT NULL"#));
        assert!(sql(json!([{ "refreshToken": null }]))
            .contains(r#""users"."refresh_token" IS NULL"#));
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let contains = sql(json!([{ "name": { "$cont": "JO" } }]));
        assert!(contains.contains(r#"LOWER("users"."name")"#));
        assert!(contains.contains("LIKE '%jo%'"));

        assert!(sql(json!([{ "name": { "$notcont": "jo" } }])).contains("NOT LIKE '%jo%'"));
        assert!(sql(json!([{ "name": { "$starts": "Jo" } }])).contains("LIKE 'jo%'"));
        assert!(sql(json!([{ "name": { "$ends": "HN" } }])).contains("LIKE '%hn'"));
    }

    #[test]
    fn test_groups_or_and_fields_and() {
        let or = sql(json!([{ "name": "a" }, { "name": "b" }]));
        assert!(or.contains(r#""users"."name" = 'a'"#));
        assert!(or.contains(" OR "));
        assert!(or.contains(r#""users"."name" = 'b'"#));

        let and = sql(json!([{ "name": "a", "email": "b" }]));
        assert!(and.contains(r#""users"."name" = 'a' AND "users"."email" = 'b'"#));

        let nested = sql(json!([{ "email": "x" }, [{ "name": "a" }, { "name": "b" }]]));
        assert_eq!(nested.matches(" OR ").count(), 2);
    }

    #[test]
    fn test_empty_filter_adds_no_constraint() {
        let query = sql(json!([]));
        assert!(!query.contains("FALSE"));
        assert!(!query.contains(" = "));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let error = SeaOrmConditionParser::<UserTable>::new()
            .parse(&json!([{ "nickname": "jo" }]))
            .unwrap_err();
        assert_eq!(error, FilterError::UnknownField("nickname".to_string()));
    }

    #[test]
    fn test_column_resolution() {
        assert!(resolve_column::<UserTable>("refreshTokenExpiration").is_ok());
        assert!(resolve_column::<UserTable>("created_at").is_ok());
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(like_escape("50%_off\\"), "50\\%\\_off\\\\");
    }
}
