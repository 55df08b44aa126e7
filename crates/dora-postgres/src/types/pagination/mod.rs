//! Keyset pagination types for database queries.

mod cursor;

pub use cursor::{Cursor, CursorPage, CursorPagination};
