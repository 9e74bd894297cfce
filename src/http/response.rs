//! Request outcomes.
//!
//! # Responsibilities
//! - Model the two ways a request ends: a response or a failure
//! - Turn errors and panic payloads into a loggable `Failure`
//! - Let error mapping code mark a response as the product of a failure

use std::any::Any;

use axum::http::{header, Response};

/// How a request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Response {
        status: u16,
        content_type: Option<String>,
    },
    Failure(Failure),
}

impl Outcome {
    pub fn from_response<B>(response: &Response<B>) -> Self {
        Outcome::Response {
            status: response.status().as_u16(),
            content_type: response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    /// Response status, else the failure's code, else 500.
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Response { status, .. } => *status,
            Outcome::Failure(failure) => failure.code.unwrap_or(500),
        }
    }
}

/// An unhandled error or panic that ended a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Short type name, e.g. `"ParseIntError"`.
    pub type_name: String,
    pub message: String,
    /// Status code carried by the error, if it has one.
    pub code: Option<u16>,
}

impl Failure {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        Self::new(short_type_name::<E>(), err.to_string())
    }

    /// Build from the payload of a caught panic.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Self::new("panic", message)
    }

    /// Mark `response` as produced by this failure; the access log then
    /// takes the exception path for it.
    pub fn attach<B>(self, response: &mut Response<B>) {
        response.extensions_mut().insert(self);
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

/// Last path segment of a type name, generics removed.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
