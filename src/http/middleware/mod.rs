//! HTTP middleware components.

pub mod access_log;
pub mod endpoint;

pub use access_log::access_log_middleware;
pub use endpoint::{endpoint, EndpointLayer};
