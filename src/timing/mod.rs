//! Request timing subsystem.
//!
//! # Data Flow
//! ```text
//! start hook  → RequestContext::activate (request_start)
//! query timer → RequestContext::record_db_time (accumulates)
//! end hook    → RequestContext::snapshot(now) → duration / db / view
//! ```

pub mod clock;
pub mod context;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{Phase, RequestContext};
pub use state::{RequestTiming, TimingSnapshot};
