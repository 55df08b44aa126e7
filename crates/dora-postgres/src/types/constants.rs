//! Constants used throughout the crate.

/// Default number of items per page when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum number of items per page.
pub const MAX_PAGE_SIZE: i64 = 100;
