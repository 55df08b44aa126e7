//! Database models for all entities in the system.
//!
//! This module contains Diesel model definitions for all database tables,
//! including structs for querying and inserting records. Deployment events are
//! append-only, so there is no update model.

mod deployment_event;

pub use deployment_event::{DeploymentEvent, NewDeploymentEvent};
