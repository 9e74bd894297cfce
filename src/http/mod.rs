//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! request
//!     → middleware/access_log.rs (start hook, context, panic capture)
//!     → request.rs (method, path, query, host)
//!     → middleware/endpoint.rs (route names its endpoint)
//!     → handler
//!     → response.rs (Outcome: response or failure)
//!     → end / exception hook
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use middleware::{endpoint, EndpointLayer};
pub use request::RequestInfo;
pub use response::{Failure, Outcome};
pub use server::HttpServer;
