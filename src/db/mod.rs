//! Database query timing.
//!
//! # Data Flow
//! ```text
//! db layer "before execute" → QueryTimer::before_query → QueryStack::push
//! db layer "after execute"  → QueryTimer::after_query  → QueryStack::pop
//!                                                      → RequestContext::record_db_time
//! query future dropped early → QueryGuard::drop        → QueryStack::discard
//! ```
//!
//! # Preconditions
//! - One query in flight per connection at a time (synchronous drivers)
//! - The request context must be current for all work done on behalf of the
//!   request; see [`crate::timing::RequestContext::scope`]

pub mod connection;
pub mod query_timer;

pub use connection::{ConnectionId, QueryStack, TimedConnection};
pub use query_timer::{QueryGuard, QueryTimer};
