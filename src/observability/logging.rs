//! Structured logging setup.
//!
//! # Responsibilities
//! - Install the global tracing subscriber
//! - Choose lograge JSON lines or the human-readable formatter
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured filter when set
//! - Installation errors are returned, never panicked on

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::observability::format::LogrageFormat;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Build the filter: `RUST_LOG` if set, else the configured directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.filter)?),
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let registry = tracing_subscriber::registry().with(build_filter(config)?);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().event_format(LogrageFormat::new()))
            .try_init()?,
        LogFormat::Pretty => registry.with(fmt::layer()).try_init()?,
    }

    Ok(())
}
