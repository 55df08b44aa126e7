//! Database query repositories.
//!
//! Repositories are traits implemented on [`PgConnection`] so that any pooled
//! connection (see [`PgConn`]) can run them directly.
//!
//! [`PgConnection`]: crate::PgConnection
//! [`PgConn`]: crate::PgConn

pub mod deployment_event;

pub use deployment_event::DeploymentEventRepository;
