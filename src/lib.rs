//! Lograge-style access logging for axum.
//!
//! One structured JSON line per request: method, path, route identity,
//! status, and a timing breakdown of total, database and view time.
//!
//! ```ignore
//! let access_log = AccessLog::new();
//! let app = access_log.init_app(Router::new().route("/", get(index)));
//! ```

pub mod access;
pub mod config;
pub mod db;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod timing;

pub use access::{AccessLog, AccessRecord, Severity};
pub use config::LogrageConfig;
pub use db::{QueryGuard, QueryTimer, TimedConnection};
pub use http::{endpoint, Failure, HttpServer};
pub use observability::{LogrageFormat, MemorySink, TracingSink};
pub use timing::RequestContext;
