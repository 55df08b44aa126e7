//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod pg_error;
mod store_error;

pub use http_error::{Error, ErrorKind, Result};

/// Tracing target for errors converted at the handler boundary.
const TRACING_TARGET: &str = "dora_server::handler::errors";
