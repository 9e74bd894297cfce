//! Access log middleware.

use std::panic::AssertUnwindSafe;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;

use crate::access::AccessLog;
use crate::http::request::RequestInfo;
use crate::http::response::Failure;
use crate::timing::RequestContext;

/// Drives the access log hooks around the inner service.
///
/// A panic in the inner service goes to the exception hook and is answered
/// with a plain 500.
pub async fn access_log_middleware(
    State(access_log): State<AccessLog>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::new();
    access_log.on_request_start(Some(&ctx));

    let info = RequestInfo::from_request(&request);
    request.extensions_mut().insert(ctx.clone());

    let result = ctx
        .scope(AssertUnwindSafe(next.run(request)).catch_unwind())
        .await;

    match result {
        Ok(response) => access_log.on_request_end(Some(&ctx), &info, response),
        Err(payload) => {
            let failure = Failure::from_panic(payload.as_ref());
            access_log.on_unhandled_exception(Some(&ctx), &info, failure);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
