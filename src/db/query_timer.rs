//! Database time accounting.
//!
//! # Responsibilities
//! - `before_query`: push the start time onto the connection's stack
//! - `after_query`: pop it and charge the elapsed time to the request that
//!   is current when the query *finishes*
//!
//! # Design Decisions
//! - Missing connection, missing request or empty stack are silent no-ops
//! - The stack is popped even when no request is current, so depth always
//!   matches the number of open queries; the sample is then discarded
//! - `start_query` returns a `QueryGuard`; a query future dropped before it
//!   completes (timeout, cancellation, panic) releases its own entry and
//!   charges nothing

use std::future::Future;
use std::sync::Arc;

use crate::db::connection::QueryStack;
use crate::timing::{Clock, RequestContext, SystemClock};

/// Hook pair for a database layer's pre/post execute notifications.
#[derive(Debug, Clone)]
pub struct QueryTimer {
    clock: Arc<dyn Clock>,
}

impl QueryTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn before_query(&self, conn: Option<&QueryStack>) {
        let Some(conn) = conn else {
            return;
        };
        conn.push(self.clock.now_ms());
    }

    /// Pre-execute hook whose entry is released if the query never finishes.
    pub fn start_query<'a>(&'a self, conn: &'a QueryStack) -> QueryGuard<'a> {
        let slot = conn.push(self.clock.now_ms());
        QueryGuard {
            timer: self,
            conn,
            slot,
            finished: false,
        }
    }

    /// Post-execute hook using the task's current request.
    pub fn after_query(&self, conn: Option<&QueryStack>) {
        self.after_query_in(conn, RequestContext::current().as_ref());
    }

    /// Post-execute hook with the request context passed explicitly.
    pub fn after_query_in(&self, conn: Option<&QueryStack>, ctx: Option<&RequestContext>) {
        let Some(conn) = conn else {
            return;
        };
        let Some(start) = conn.pop() else {
            tracing::trace!(connection = %conn.id(), "Query finished with empty timing stack");
            return;
        };
        let elapsed = self.clock.now_ms() - start;

        match ctx {
            Some(ctx) => ctx.record_db_time(elapsed),
            None => {
                tracing::trace!(
                    connection = %conn.id(),
                    elapsed_ms = elapsed,
                    "Query finished outside a request, time dropped"
                );
            }
        }
    }

    /// Bracket a query future with both hooks.
    pub async fn instrument<F: Future>(&self, conn: &QueryStack, query: F) -> F::Output {
        let guard = self.start_query(conn);
        let output = query.await;
        guard.finish();
        output
    }
}

/// An open query on a connection, from [`QueryTimer::start_query`].
#[derive(Debug)]
#[must_use = "dropping the guard abandons the query timing"]
pub struct QueryGuard<'a> {
    timer: &'a QueryTimer,
    conn: &'a QueryStack,
    slot: usize,
    finished: bool,
}

impl QueryGuard<'_> {
    /// Run the post-execute hook for this query.
    pub fn finish(mut self) {
        self.finished = true;
        self.timer.after_query(Some(self.conn));
    }
}

impl Drop for QueryGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let removed = self.conn.discard(self.slot);
        tracing::trace!(
            connection = %self.conn.id(),
            removed,
            "Query abandoned before completion, time dropped"
        );
    }
}

impl Default for QueryTimer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
