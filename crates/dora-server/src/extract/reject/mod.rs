//! Enhanced request extractors with improved error handling.
//!
//! Drop-in replacements for the axum extractors whose rejections are
//! converted into the API error body instead of plain-text responses.

pub mod enhanced_json;
pub mod enhanced_path;
pub mod enhanced_query;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::enhanced_query::Query;

/// Tracing target for rejected extractions.
const TRACING_TARGET: &str = "dora_server::extract::reject";
