//! Destinations for access records.
//!
//! # Responsibilities
//! - Hand a finished record (message + fields + severity) to a logger
//! - Keep records in memory when embedding or testing
//!
//! # Design Decisions
//! - The tracing sink carries the whole record as one JSON field so that
//!   nulls and the params map survive the trip through `tracing`
//! - Serialization failures are reported and the record dropped; the
//!   request itself is never affected

use parking_lot::Mutex;

use crate::access::record::{AccessRecord, Severity};

/// Target of every access-log event.
pub const LOG_TARGET: &str = "lograge";

/// Event field holding the JSON-encoded record.
pub const RECORD_FIELD: &str = "lograge";

/// Receives one access record per logged request.
pub trait LogSink: Send + Sync + std::fmt::Debug {
    fn emit(&self, severity: Severity, message: &str, record: &AccessRecord);
}

/// Emits records as `tracing` events on the `lograge` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, severity: Severity, message: &str, record: &AccessRecord) {
        let fields = match serde_json::to_string(record) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(error = %e, path = %record.path, "Dropping unserializable access record");
                return;
            }
        };

        match severity {
            Severity::Info => {
                tracing::info!(target: LOG_TARGET, lograge = fields.as_str(), "{}", message)
            }
            Severity::Error => {
                tracing::error!(target: LOG_TARGET, lograge = fields.as_str(), "{}", message)
            }
        }
    }
}

/// One captured access-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedLog {
    pub severity: Severity,
    pub message: String,
    pub record: AccessRecord,
}

/// Keeps every emitted record, oldest first.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<CapturedLog>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<CapturedLog> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, severity: Severity, message: &str, record: &AccessRecord) {
        self.entries.lock().push(CapturedLog {
            severity,
            message: message.to_string(),
            record: record.clone(),
        });
    }
}
