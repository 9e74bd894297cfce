//! Request introspection for access records.
//!
//! # Responsibilities
//! - Capture method, path, query string and host before the handler runs
//! - Decode the query string into a multi-valued parameter map
//!
//! # Design Decisions
//! - Captured up front: the handler consumes the request
//! - Host comes from the absolute URI when present, else the Host header
//!   with any port stripped
//! - The path is logged percent-decoded; invalid UTF-8 is replaced

use std::collections::BTreeMap;

use axum::http::{header, Request};
use percent_encoding::percent_decode_str;

/// Query parameters, each name mapped to all of its values in order.
pub type Params = BTreeMap<String, Vec<String>>;

/// What the access log needs to know about an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub host: Option<String>,
    /// Logical endpoint, `"<controller>.<action>"`, when a route matched.
    pub endpoint: Option<String>,
}

impl RequestInfo {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let uri = request.uri();
        let host = uri.host().map(str::to_string).or_else(|| {
            request
                .headers()
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(strip_port)
                .filter(|h| !h.is_empty())
        });

        Self {
            method: request.method().to_string(),
            path: percent_decode_str(uri.path()).decode_utf8_lossy().into_owned(),
            query: uri.query().map(str::to_string),
            host,
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Split the endpoint on its first `.` into (controller, action).
    pub fn controller_action(&self) -> (Option<String>, Option<String>) {
        match &self.endpoint {
            Some(endpoint) => {
                let (controller, action) = endpoint.split_once('.').unwrap_or((endpoint.as_str(), ""));
                (Some(controller.to_string()), Some(action.to_string()))
            }
            None => (None, None),
        }
    }

    pub fn params(&self) -> Params {
        self.query.as_deref().map(parse_query).unwrap_or_default()
    }
}

/// Decode a urlencoded query string. Pairs with empty values are skipped.
pub fn parse_query(query: &str) -> Params {
    let mut params = Params::new();
    for (name, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params.entry(name.into_owned()).or_default().push(value.into_owned());
    }
    params
}

fn strip_port(host: &str) -> String {
    // Bracketed IPv6 literal, e.g. "[::1]:8080"
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or_default().to_string();
    }
    host.split(':').next().unwrap_or_default().to_string()
}
