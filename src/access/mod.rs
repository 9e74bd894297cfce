//! Access logging core.
//!
//! # Data Flow
//! ```text
//! request → AccessLog::on_request_start
//!         → handler (queries feed QueryTimer → RequestContext)
//!         → AccessLog::on_request_end / on_unhandled_exception
//!         → RecordBuilder::build → (message, AccessRecord)
//!         → LogSink::emit
//! ```

pub mod controller;
pub mod record;

pub use controller::AccessLog;
pub use record::{AccessRecord, RecordBuilder, Severity};
