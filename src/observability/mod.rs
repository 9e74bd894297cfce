//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! access::AccessLog
//!     → sink.rs (LogSink: tracing event on target "lograge", or memory)
//!     → tracing subscriber (logging.rs)
//!     → format.rs (one JSON object per line)
//!     → stdout
//! ```

pub mod format;
pub mod logging;
pub mod sink;

pub use format::{LogEvent, LogrageFormat, LogrageFormatter, RECOGNIZED_KEYS};
pub use logging::{init_logging, LoggingError};
pub use sink::{CapturedLog, LogSink, MemorySink, TracingSink, LOG_TARGET};
