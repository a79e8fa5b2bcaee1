//! Paginated search result envelope.

use serde::Serialize;

use super::search_params::{SearchParams, SortParam};

/// Search results plus pagination metadata.
///
/// `last_page` is derived from `total` and `per_page` on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    items: Vec<T>,
    total: u64,
    current_page: Option<u64>,
    per_page: Option<u64>,
    last_page: u64,
    sort: Option<SortParam>,
}

impl<T> SearchResult<T> {
    pub fn new(
        items: Vec<T>,
        total: u64,
        current_page: Option<u64>,
        per_page: Option<u64>,
        sort: Option<SortParam>,
    ) -> Self {
        Self {
            last_page: last_page(total, per_page),
            items,
            total,
            current_page,
            per_page,
            sort,
        }
    }

    /// Take page, page size and sort from the request that produced `items`.
    pub fn from_params<F>(items: Vec<T>, total: u64, params: &SearchParams<F>) -> Self {
        Self::new(
            items,
            total,
            params.page(),
            params.per_page(),
            params.sort().cloned(),
        )
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn current_page(&self) -> Option<u64> {
        self.current_page
    }

    pub fn per_page(&self) -> Option<u64> {
        self.per_page
    }

    pub fn last_page(&self) -> u64 {
        self.last_page
    }

    pub fn sort(&self) -> Option<&SortParam> {
        self.sort.as_ref()
    }

    /// Convert every item, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResult<U> {
        SearchResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
            last_page: self.last_page,
            sort: self.sort,
        }
    }
}

/// Without a page size everything fits on one page (or none when empty).
fn last_page(total: u64, per_page: Option<u64>) -> u64 {
    match per_page {
        Some(per_page) if per_page > 0 => total.div_ceil(per_page),
        _ => u64::from(total > 0),
    }
}
