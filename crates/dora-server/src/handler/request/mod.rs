//! Request types for HTTP handlers.

mod deployments;
mod metrics;
mod paths;

pub use deployments::*;
pub use metrics::*;
pub use paths::*;
