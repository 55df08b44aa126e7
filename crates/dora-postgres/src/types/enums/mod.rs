//! Database enumeration types for type-safe queries.
//!
//! Each enumeration corresponds to a PostgreSQL ENUM type defined in the
//! migrations and provides serialization support for APIs and Diesel.

pub mod deployment_status;

pub use deployment_status::DeploymentStatus;
