//! Request lifecycle controller.
//!
//! # Responsibilities
//! - Start hook: mark the request start
//! - End hook: log the response at a severity chosen from its status
//! - Exception hook: log an unhandled failure at error severity
//! - Wire all three into an axum `Router`
//!
//! # Design Decisions
//! - At most one line per request: the first completing hook wins
//! - 5xx responses on the normal path are not logged; failures are
//! - A missing request context degrades to unknown timings, never an error

use std::sync::Arc;

use axum::http::Response;
use axum::middleware;
use axum::Router;

use crate::access::record::{RecordBuilder, Severity};
use crate::db::QueryTimer;
use crate::http::middleware::access_log_middleware;
use crate::http::request::RequestInfo;
use crate::http::response::{Failure, Outcome};
use crate::observability::sink::{LogSink, TracingSink};
use crate::timing::{Clock, RequestContext, SystemClock, TimingSnapshot};

/// Lograge-style access logger.
#[derive(Debug, Clone)]
pub struct AccessLog {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
    builder: RecordBuilder,
}

impl AccessLog {
    /// Wall clock, records emitted through `tracing`.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
            builder: RecordBuilder::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Query hooks for the database layer, sharing this logger's clock.
    pub fn query_timer(&self) -> QueryTimer {
        QueryTimer::new(self.clock.clone())
    }

    /// Install the start, end and exception hooks on `router`.
    pub fn init_app<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        tracing::debug!("Registering access log hooks");
        router.layer(middleware::from_fn_with_state(self.clone(), access_log_middleware))
    }

    pub fn on_request_start(&self, ctx: Option<&RequestContext>) {
        let Some(ctx) = ctx else {
            return;
        };
        ctx.activate(self.clock.now_ms());
    }

    /// Log a finished response and hand it back untouched.
    ///
    /// A response carrying a [`Failure`] extension is logged as a failure.
    pub fn on_request_end<B>(
        &self,
        ctx: Option<&RequestContext>,
        info: &RequestInfo,
        response: Response<B>,
    ) -> Response<B> {
        if let Some(failure) = response.extensions().get::<Failure>() {
            let mut failure = failure.clone();
            failure.code.get_or_insert(response.status().as_u16());
            self.on_unhandled_exception(ctx, info, failure);
            return response;
        }

        let outcome = Outcome::from_response(&response);
        match Severity::for_status(outcome.status()) {
            Some(severity) => self.emit(ctx, info, &outcome, severity),
            None => {
                if let Some(ctx) = ctx {
                    ctx.complete();
                }
                tracing::trace!(status = outcome.status(), path = %info.path, "Skipping server error response");
            }
        }

        response
    }

    pub fn on_unhandled_exception(
        &self,
        ctx: Option<&RequestContext>,
        info: &RequestInfo,
        failure: Failure,
    ) {
        self.emit(ctx, info, &Outcome::Failure(failure), Severity::Error);
    }

    fn emit(
        &self,
        ctx: Option<&RequestContext>,
        info: &RequestInfo,
        outcome: &Outcome,
        severity: Severity,
    ) {
        let now = self.clock.now_ms();
        let (timing, endpoint) = match ctx {
            Some(ctx) => {
                if !ctx.complete() {
                    tracing::trace!(path = %info.path, "Request already logged");
                    return;
                }
                (ctx.snapshot(now), ctx.endpoint().or_else(|| info.endpoint.clone()))
            }
            None => (TimingSnapshot::default(), info.endpoint.clone()),
        };

        let info = info.clone().with_endpoint(endpoint);
        let (message, record) = self.builder.build(&info, outcome, timing);
        self.sink.emit(severity, &message, &record);
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::new()
    }
}
