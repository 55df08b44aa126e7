//! Cursor-based pagination for deployment event queries.
//!
//! Deployment events are read in aggregation order, `(deployment_timestamp,
//! created_at, id)` ascending. A cursor captures that triple for the last row
//! of a page so the next page starts strictly after it, independent of rows
//! appended in the meantime.

use std::cmp::Ordering;

use base64::prelude::*;
use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A cursor representing a position in a paginated result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(into = "String", try_from = "String")]
pub struct Cursor {
    /// Deployment timestamp of the last seen item.
    pub deployed_at: Timestamp,
    /// Creation timestamp of the last seen item (first tiebreaker).
    pub created_at: Timestamp,
    /// ID of the last seen item (second tiebreaker).
    pub id: Uuid,
}

impl Cursor {
    /// Creates a new cursor from the ordering key of an item.
    pub fn new(deployed_at: Timestamp, created_at: Timestamp, id: Uuid) -> Self {
        Self {
            deployed_at,
            created_at,
            id,
        }
    }

    /// Encodes the cursor as a URL-safe base64 string.
    pub fn encode(&self) -> String {
        let data = format!("{}|{}|{}", self.deployed_at, self.created_at, self.id);
        BASE64_URL_SAFE_NO_PAD.encode(data.as_bytes())
    }

    /// Decodes a cursor from a URL-safe base64 string.
    ///
    /// Returns `None` if the string is invalid or malformed.
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let data = String::from_utf8(bytes).ok()?;

        let mut parts = data.split('|');
        let deployed_at = parts.next()?.parse().ok()?;
        let created_at = parts.next()?.parse().ok()?;
        let id = parts.next()?.parse().ok()?;

        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(deployed_at, created_at, id))
    }

    /// Returns the ordering key as a tuple.
    #[inline]
    pub fn key(&self) -> (Timestamp, Timestamp, Uuid) {
        (self.deployed_at, self.created_at, self.id)
    }

    /// Returns whether an item with the given key sorts strictly after this cursor.
    #[inline]
    pub fn precedes(&self, key: (Timestamp, Timestamp, Uuid)) -> bool {
        self.key().cmp(&key) == Ordering::Less
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.encode()
    }
}

impl TryFrom<String> for Cursor {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cursor::decode(&value).ok_or("invalid cursor format")
    }
}

/// Cursor-based pagination parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CursorPagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Cursor pointing to the last item of the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Cursor>,
    /// Whether to include total count in the response.
    #[serde(default)]
    pub include_count: bool,
}

impl Default for CursorPagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl CursorPagination {
    /// Creates a new cursor pagination with the given limit.
    pub fn new(limit: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            after: None,
            include_count: false,
        }
    }

    /// Creates a pagination whose limit is not clamped to [`MAX_PAGE_SIZE`].
    ///
    /// Used by internal readers that scan whole windows in large pages.
    pub fn unbounded(limit: i64) -> Self {
        Self {
            limit: limit.max(1),
            after: None,
            include_count: false,
        }
    }

    /// Continues pagination after the given cursor.
    pub fn with_after(mut self, cursor: Option<Cursor>) -> Self {
        self.after = cursor;
        self
    }

    /// Enables including total count in the response.
    pub fn with_count(mut self) -> Self {
        self.include_count = true;
        self
    }

    /// Returns the limit plus one, used to detect whether more pages exist.
    pub fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }

    /// Checks if we have a cursor to paginate from.
    pub fn has_cursor(&self) -> bool {
        self.after.is_some()
    }
}

/// Result of a cursor-paginated query.
#[derive(Debug, Clone)]
pub struct CursorPage<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total count of items matching the query (across all pages).
    pub total: Option<i64>,
    /// Cursor to fetch the next page. Present only when more items exist.
    pub next_cursor: Option<Cursor>,
}

impl<T> CursorPage<T> {
    /// Creates a new cursor page from query results.
    ///
    /// `items` should hold up to `limit + 1` rows; the extra row only signals
    /// that another page exists and is dropped.
    pub fn new<F>(mut items: Vec<T>, total: Option<i64>, limit: i64, cursor_fn: F) -> Self
    where
        F: Fn(&T) -> Cursor,
    {
        let has_more = items.len() as i64 > limit;
        if has_more {
            items.truncate(limit.max(0) as usize);
        }

        let next_cursor = if has_more {
            items.last().map(cursor_fn)
        } else {
            None
        };

        Self {
            items,
            total,
            next_cursor,
        }
    }

    /// Creates an empty cursor page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Some(0),
            next_cursor: None,
        }
    }

    /// Returns true if there are more items to fetch.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> CursorPage<U>
    where
        F: FnMut(T) -> U,
    {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_at(seconds: i64) -> Cursor {
        let ts = Timestamp::from_second(seconds).unwrap();
        Cursor::new(ts, ts, Uuid::now_v7())
    }

    #[test]
    fn cursor_encode_decode() {
        let cursor = cursor_at(1_760_968_826);
        let decoded = Cursor::decode(&cursor.encode()).expect("decode should succeed");
        assert_eq!(cursor, decoded);
    }

    #[test]
    fn cursor_decode_invalid() {
        assert!(Cursor::decode("invalid").is_none());
        assert!(Cursor::decode("").is_none());

        let two_parts = BASE64_URL_SAFE_NO_PAD.encode(format!("{}|{}", Timestamp::UNIX_EPOCH, Uuid::nil()));
        assert!(Cursor::decode(&two_parts).is_none());

        let four_parts = BASE64_URL_SAFE_NO_PAD.encode(format!(
            "{0}|{0}|{1}|extra",
            Timestamp::UNIX_EPOCH,
            Uuid::nil()
        ));
        assert!(Cursor::decode(&four_parts).is_none());
    }

    #[test]
    fn cursor_orders_by_all_three_keys() {
        let ts = Timestamp::from_second(100).unwrap();
        let later = Timestamp::from_second(101).unwrap();
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);

        let cursor = Cursor::new(ts, ts, low);
        assert!(cursor.precedes((later, ts, low)));
        assert!(cursor.precedes((ts, later, low)));
        assert!(cursor.precedes((ts, ts, high)));
        assert!(!cursor.precedes((ts, ts, low)));
    }

    #[test]
    fn cursor_pagination_limit_bounds() {
        assert_eq!(CursorPagination::new(0).limit, 1);
        assert_eq!(CursorPagination::new(200).limit, MAX_PAGE_SIZE);
        assert_eq!(CursorPagination::default().limit, DEFAULT_PAGE_SIZE);
        assert_eq!(CursorPagination::unbounded(500).limit, 500);
        assert_eq!(CursorPagination::new(50).fetch_limit(), 51);
    }

    #[test]
    fn cursor_page_with_more() {
        let items: Vec<i64> = (1..=51).collect();
        let page = CursorPage::new(items, Some(100), 50, |i| cursor_at(*i));

        assert_eq!(page.items.len(), 50);
        assert_eq!(page.total, Some(100));
        assert!(page.has_more());
        assert_eq!(
            page.next_cursor.map(|c| c.deployed_at),
            Some(Timestamp::from_second(50).unwrap())
        );
    }

    #[test]
    fn cursor_page_without_more() {
        let items: Vec<i64> = (1..=30).collect();
        let page = CursorPage::new(items, None, 50, |i| cursor_at(*i));

        assert_eq!(page.items.len(), 30);
        assert_eq!(page.total, None);
        assert!(!page.has_more());
    }
}
