//! Enhanced HTTP request extractors.
//!
//! - [`Json`] - JSON bodies; failures become `invalid_payload` errors
//! - [`Path`] - path parameters with detailed error context
//! - [`Query`] - query strings with enhanced error messages

pub mod reject;

pub use crate::extract::reject::{Json, Path, Query};
