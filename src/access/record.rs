//! Access record assembly.
//!
//! # Responsibilities
//! - Combine request info, outcome and timing into one flat record
//! - Produce the one-line summary message
//! - Pick the severity for a response status
//!
//! # Design Decisions
//! - Every field is always present; unknown values serialize as `null`
//! - Absent controller/action render as `None` in the summary

use serde::{Deserialize, Serialize};

use crate::http::request::{Params, RequestInfo};
use crate::http::response::Outcome;
use crate::timing::TimingSnapshot;

/// Placeholder for an absent controller or action in the summary message.
pub const NONE_TOKEN: &str = "None";

/// Severity of one access-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
        }
    }

    /// Severity for a normally completed response, `None` when it must not
    /// be logged.
    ///
    /// 5xx is skipped, 404 is informational, any other 4xx is an error.
    pub fn for_status(status: u16) -> Option<Severity> {
        match status {
            500..=u16::MAX => None,
            404 => Some(Severity::Info),
            400..=499 => Some(Severity::Error),
            _ => Some(Severity::Info),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request's structured fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub method: String,
    pub path: String,
    pub format: Option<String>,
    pub duration: Option<f64>,
    pub controller: Option<String>,
    pub action: Option<String>,
    pub status: u16,
    pub view: Option<f64>,
    pub db: Option<f64>,
    pub params: Params,
    pub exception: Option<String>,
    pub exception_object: Option<String>,
    pub host: Option<String>,
}

/// Builds access records; stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder;

impl RecordBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Returns the summary message and the record.
    pub fn build(
        &self,
        info: &RequestInfo,
        outcome: &Outcome,
        timing: TimingSnapshot,
    ) -> (String, AccessRecord) {
        let (controller, action) = info.controller_action();
        let status = outcome.status();

        let (format, exception, exception_object) = match outcome {
            Outcome::Response { content_type, .. } => (content_type.clone(), None, None),
            Outcome::Failure(failure) => (
                None,
                Some(failure.message.clone()),
                Some(failure.type_name.clone()),
            ),
        };

        let message = format!(
            "[{}] {} {} ({}#{})",
            status,
            info.method,
            info.path,
            controller.as_deref().unwrap_or(NONE_TOKEN),
            action.as_deref().unwrap_or(NONE_TOKEN),
        );

        let record = AccessRecord {
            method: info.method.clone(),
            path: info.path.clone(),
            format,
            duration: timing.duration,
            controller,
            action,
            status,
            view: timing.view(),
            db: timing.db,
            params: info.params(),
            exception,
            exception_object,
            host: info.host.clone(),
        };

        (message, record)
    }
}
