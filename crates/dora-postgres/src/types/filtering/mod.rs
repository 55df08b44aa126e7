//! Filtering options for database queries.

mod deployments;

pub use deployments::DeploymentFilter;
