//! Search request normalization.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::filter::{ConditionParser, FilterError};
use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PER_PAGE, MAX_QUERY_ROWS};
use crate::domain::entity::is_truthy;

/// Raw search input, as received from a caller.
///
/// `page`, `perPage`, `sort` and `filter` stay untyped so that malformed
/// values can be normalized instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchProps {
    pub page: Value,
    pub per_page: Value,
    pub sort: Value,
    pub filter: Value,
    pub attributes: Vec<String>,
    pub include: Vec<IncludeConfig>,
    pub ignore_paging: bool,
}

/// Relation inclusion directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeConfig {
    pub relation: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Ordered `field -> direction` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortParam(Vec<(String, SortDirection)>);

impl SortParam {
    pub fn new(fields: Vec<(String, SortDirection)>) -> Self {
        Self(fields)
    }

    /// `None` for falsy input; otherwise an object of `field: "asc"|"desc"`.
    pub fn from_value(value: &Value) -> Result<Option<Self>, FilterError> {
        if !is_truthy(value) {
            return Ok(None);
        }
        let Value::Object(fields) = value else {
            return Err(FilterError::InvalidSort {
                field: String::new(),
                direction: value.to_string(),
            });
        };
        fields
            .iter()
            .map(|(field, direction)| {
                direction
                    .as_str()
                    .and_then(SortDirection::parse)
                    .map(|direction| (field.clone(), direction))
                    .ok_or_else(|| FilterError::InvalidSort {
                        field: field.clone(),
                        direction: direction.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|fields| Some(Self(fields)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.0.iter().map(|(field, direction)| (field.as_str(), *direction))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SortParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, direction) in &self.0 {
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }
}

/// Normalized search request.
///
/// `F` is the translated filter produced by the injected [`ConditionParser`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams<F> {
    page: Option<u64>,
    per_page: Option<u64>,
    sort: Option<SortParam>,
    filter: Option<F>,
    attributes: Vec<String>,
    include: Vec<IncludeConfig>,
    ignore_paging: bool,
}

impl<F> Default for SearchParams<F> {
    fn default() -> Self {
        Self {
            page: Some(DEFAULT_PAGE_NUMBER),
            per_page: Some(DEFAULT_PER_PAGE),
            sort: None,
            filter: None,
            attributes: Vec::new(),
            include: Vec::new(),
            ignore_paging: false,
        }
    }
}

impl<F> SearchParams<F> {
    /// Normalize raw input, translating the filter with `parser`.
    pub fn new(
        props: SearchProps,
        parser: &dyn ConditionParser<Output = F>,
    ) -> Result<Self, FilterError>
    where
        F: Clone + Send + Sync + 'static,
    {
        let mut params = Self {
            attributes: props.attributes,
            include: props.include,
            ignore_paging: props.ignore_paging,
            ..Self::default()
        };
        params.set_page(&props.page);
        params.set_per_page(&props.per_page);
        params.sort = SortParam::from_value(&props.sort)?;
        if is_truthy(&props.filter) {
            params.filter = Some(parser.parse(&props.filter)?);
        }

        tracing::debug!(
            page = ?params.page,
            per_page = ?params.per_page,
            filtered = params.filter.is_some(),
            "Search parameters normalized"
        );
        Ok(params)
    }

    /// Invalid, non-positive or fractional input falls back to page 1.
    pub fn set_page(&mut self, value: &Value) {
        if self.ignore_paging {
            self.page = None;
            return;
        }
        self.page = Some(positive_integer(value).unwrap_or(DEFAULT_PAGE_NUMBER));
    }

    /// Invalid input, and a literal `true`, keep the current page size.
    pub fn set_per_page(&mut self, value: &Value) {
        if self.ignore_paging {
            self.per_page = None;
            return;
        }
        let current = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        self.per_page = Some(match value {
            Value::Bool(true) => current,
            other => positive_integer(other).unwrap_or(current),
        });
    }

    pub fn page(&self) -> Option<u64> {
        self.page
    }

    pub fn per_page(&self) -> Option<u64> {
        self.per_page
    }

    pub fn sort(&self) -> Option<&SortParam> {
        self.sort.as_ref()
    }

    pub fn filter(&self) -> Option<&F> {
        self.filter.as_ref()
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn include(&self) -> &[IncludeConfig] {
        &self.include
    }

    pub fn ignore_paging(&self) -> bool {
        self.ignore_paging
    }

    /// Rows to skip; `None` when paging is ignored. Capped at `MAX_QUERY_ROWS`.
    pub fn skip(&self) -> Option<u64> {
        match (self.page, self.per_page) {
            (Some(page), Some(per_page)) => Some(
                page.saturating_sub(1)
                    .saturating_mul(per_page)
                    .min(MAX_QUERY_ROWS),
            ),
            _ => None,
        }
    }

    /// Rows to take; `None` when paging is ignored.
    pub fn take(&self) -> Option<u64> {
        self.per_page
    }
}

/// Numeric coercion with JavaScript semantics; `None` stands for NaN.
fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whole numbers above zero, clamped to what OFFSET/LIMIT can bind.
fn positive_integer(value: &Value) -> Option<u64> {
    to_number(value)
        .filter(|n| n.is_finite() && *n > 0.0 && n.fract() == 0.0)
        .map(|n| (n as u64).min(MAX_QUERY_ROWS))
}
