//! Response types for HTTP handlers.

use dora_postgres::types::CursorPage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod deployments;
mod errors;
mod metrics;
mod monitors;

pub use deployments::*;
pub use errors::*;
pub use metrics::*;
pub use monitors::*;

/// Generic paginated response wrapper.
///
/// When `next_cursor` is present, there are more items to fetch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(rename = "{T}sPage")]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Total count of items matching the query (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Cursor to fetch the next page. Present only when more items exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Returns true if there are more items to fetch.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Creates a page from a cursor page, mapping items using the provided function.
    pub fn from_cursor_page<M, F>(page: CursorPage<M>, f: F) -> Self
    where
        F: FnMut(M) -> T,
    {
        Self {
            items: page.items.into_iter().map(f).collect(),
            total: page.total,
            next_cursor: page.next_cursor.map(|cursor| cursor.encode()),
        }
    }
}
