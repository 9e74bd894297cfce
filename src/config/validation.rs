//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, parsable addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: LogrageConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::LogrageConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("logging.filter must not be empty")]
    EmptyFilter,
}

pub fn validate_config(config: &LogrageConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.logging.filter.trim().is_empty() {
        errors.push(ValidationError::EmptyFilter);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
