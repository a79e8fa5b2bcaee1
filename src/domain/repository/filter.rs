//! Filter-condition DSL.
//!
//! A filter is a JSON array of condition groups. Groups are OR-ed together;
//! the fields inside one object group are AND-ed; a nested array is an OR
//! over its own groups. Each field maps either to a literal (equality) or to
//! an operator object such as `{ "$gte": 18, "$lt": 65 }`. Operator keys may
//! be written with or without the `$` prefix.
//!
//! ```text
//! [
//!   { "email": { "$eq": "john@example.com" } },
//!   { "email": { "$ne": "maria@example.com" }, "name": "Maria" },
//!   [ { "name": { "$starts": "jo" } }, { "name": { "$ends": "hn" } } ]
//! ]
//! ```

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Violations of the filter contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("filter must be an array")]
    NotAnArray,

    #[error("condition group must be an object or an array, got {0}")]
    InvalidGroup(String),

    #[error("unknown operator `{operator}` on field `{field}`")]
    UnknownOperator { field: String, operator: String },

    #[error("operator `{operator}` on field `{field}` expects {expected}")]
    InvalidOperand {
        field: String,
        operator: &'static str,
        expected: &'static str,
    },

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("invalid sort direction `{direction}` for field `{field}`")]
    InvalidSort { field: String, direction: String },
}

/// Scalar operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Scalars only; arrays and objects are not literals.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Literal::Int(i)),
                None => n.as_f64().map(Literal::Float),
            },
            Value::String(s) => Some(Literal::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => Ok(()),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Text(s) => f.write_str(s),
        }
    }
}

/// Operator vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    Ne,
    In,
    NotIn,
    IsNull,
    NotNull,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Between,
}

impl Operator {
    pub const ALL: [Operator; 15] = [
        Operator::Eq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::Ne,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
        Operator::NotNull,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Between,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Ne => "ne",
            Operator::In => "in",
            Operator::NotIn => "notin",
            Operator::IsNull => "isnull",
            Operator::NotNull => "notnull",
            Operator::Contains => "cont",
            Operator::NotContains => "notcont",
            Operator::StartsWith => "starts",
            Operator::EndsWith => "ends",
            Operator::Between => "between",
        }
    }

    /// Accepts `"$eq"` as well as `"eq"`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.strip_prefix('$').unwrap_or(key);
        Self::ALL.into_iter().find(|op| op.keyword() == key)
    }
}

/// A translated operator with its operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Eq(Literal),
    Ne(Literal),
    Lt(Literal),
    Lte(Literal),
    Gt(Literal),
    Gte(Literal),
    In(Vec<Literal>),
    NotIn(Vec<Literal>),
    IsNull,
    NotNull,
    /// Case-insensitive substring
    Contains(String),
    NotContains(String),
    StartsWith(String),
    EndsWith(String),
    /// Inclusive range
    Between(Literal, Literal),
}

impl Comparison {
    fn parse(field: &str, operator: Operator, operand: &Value) -> Result<Self, FilterError> {
        let invalid = |expected: &'static str| FilterError::InvalidOperand {
            field: field.to_string(),
            operator: operator.keyword(),
            expected,
        };
        let scalar = || Literal::from_json(operand).ok_or_else(|| invalid("a scalar value"));
        let text = || {
            Literal::from_json(operand)
                .filter(|literal| !literal.is_null())
                .map(|literal| literal.to_string())
                .ok_or_else(|| invalid("a non-null scalar value"))
        };
        let list = || match operand {
            Value::Array(items) => items
                .iter()
                .map(|item| Literal::from_json(item).ok_or_else(|| invalid("an array of scalars")))
                .collect::<Result<Vec<_>, _>>(),
            _ => Err(invalid("an array of scalars")),
        };

        Ok(match operator {
            Operator::Eq => Comparison::Eq(scalar()?),
            Operator::Ne => Comparison::Ne(scalar()?),
            Operator::Lt => Comparison::Lt(scalar()?),
            Operator::Lte => Comparison::Lte(scalar()?),
            Operator::Gt => Comparison::Gt(scalar()?),
            Operator::Gte => Comparison::Gte(scalar()?),
            Operator::In => Comparison::In(list()?),
            Operator::NotIn => Comparison::NotIn(list()?),
            Operator::IsNull => Comparison::IsNull,
            Operator::NotNull => Comparison::NotNull,
            Operator::Contains => Comparison::Contains(text()?),
            Operator::NotContains => Comparison::NotContains(text()?),
            Operator::StartsWith => Comparison::StartsWith(text()?),
            Operator::EndsWith => Comparison::EndsWith(text()?),
            Operator::Between => match list()?.as_slice() {
                [from, to] => Comparison::Between(from.clone(), to.clone()),
                _ => return Err(invalid("an array of exactly two values")),
            },
        })
    }
}

/// One `field <comparison>` test.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub comparison: Comparison,
}

/// A condition group.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Object group: every predicate must hold
    All(Vec<FieldPredicate>),
    /// Array group: any child must hold
    Any(Vec<FilterNode>),
}

impl FilterNode {
    fn parse(value: &Value) -> Result<Self, FilterError> {
        match value {
            Value::Object(fields) => Ok(FilterNode::All(parse_fields(fields)?)),
            Value::Array(groups) => Ok(FilterNode::Any(
                groups.iter().map(FilterNode::parse).collect::<Result<_, _>>()?,
            )),
            other => Err(FilterError::InvalidGroup(json_kind(other).to_string())),
        }
    }
}

fn parse_fields(fields: &Map<String, Value>) -> Result<Vec<FieldPredicate>, FilterError> {
    let mut predicates = Vec::with_capacity(fields.len());
    for (field, value) in fields {
        match value {
            Value::Object(operators) => {
                if operators.is_empty() {
                    return Err(FilterError::InvalidOperand {
                        field: field.clone(),
                        operator: "",
                        expected: "at least one operator",
                    });
                }
                for (key, operand) in operators {
                    let operator =
                        Operator::from_key(key).ok_or_else(|| FilterError::UnknownOperator {
                            field: field.clone(),
                            operator: key.clone(),
                        })?;
                    predicates.push(FieldPredicate {
                        field: field.clone(),
                        comparison: Comparison::parse(field, operator, operand)?,
                    });
                }
            }
            literal => predicates.push(FieldPredicate {
                field: field.clone(),
                comparison: Comparison::parse(field, Operator::Eq, literal)?,
            }),
        }
    }
    Ok(predicates)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parsed filter: an OR over its groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    groups: Vec<FilterNode>,
}

impl Filter {
    /// Parse a filter; the top level must be an array.
    pub fn parse(value: &Value) -> Result<Self, FilterError> {
        let Value::Array(groups) = value else {
            return Err(FilterError::NotAnArray);
        };
        let groups = groups
            .iter()
            .map(FilterNode::parse)
            .collect::<Result<_, _>>()?;
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[FilterNode] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Translates a parsed [`Filter`] into a persistence-specific predicate.
pub trait ConditionParser: Send + Sync {
    type Output: Clone + Send + Sync + 'static;

    fn translate(&self, filter: &Filter) -> Result<Self::Output, FilterError>;

    /// Parse raw filter JSON and translate it.
    fn parse(&self, input: &Value) -> Result<Self::Output, FilterError> {
        let filter = Filter::parse(input)?;
        self.translate(&filter)
    }
}

/// Keeps the engine-neutral AST as the translated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughParser;

impl ConditionParser for PassthroughParser {
    type Output = Filter;

    fn translate(&self, filter: &Filter) -> Result<Filter, FilterError> {
        Ok(filter.clone())
    }
}
