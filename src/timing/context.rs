//! Request-scoped context.
//!
//! # Responsibilities
//! - Own the timing state of exactly one in-flight request
//! - Carry the matched endpoint identifier set by route layers
//! - Track the lifecycle phase (Pending → Active → Completed)
//! - Expose "the current request" to code running inside the handler future
//!
//! # Design Decisions
//! - Shared through `Arc`; clones all point at the same request
//! - Installed as a tokio task-local for the handler future; tasks spawned
//!   elsewhere do not inherit it and must be wrapped with `scope`

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::timing::state::{RequestTiming, TimingSnapshot};

tokio::task_local! {
    static CURRENT_REQUEST: RequestContext;
}

/// Lifecycle phase of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Context exists, start hook has not run.
    Pending,
    /// Start hook ran, handler is executing.
    Active,
    /// End or exception hook ran. Terminal.
    Completed,
}

#[derive(Debug)]
struct ContextState {
    phase: Phase,
    timing: RequestTiming,
    endpoint: Option<String>,
}

/// Handle to the state of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<Mutex<ContextState>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ContextState {
                phase: Phase::Pending,
                timing: RequestTiming::new(),
                endpoint: None,
            })),
        }
    }

    /// The context installed for the running task, if any.
    pub fn current() -> Option<RequestContext> {
        CURRENT_REQUEST.try_with(|ctx| ctx.clone()).ok()
    }

    /// Run `fut` with this context as the current request.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        CURRENT_REQUEST.scope(self.clone(), fut).await
    }

    /// Synchronous counterpart of [`RequestContext::scope`].
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_REQUEST.sync_scope(self.clone(), f)
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    /// Pending → Active, recording the start time.
    pub fn activate(&self, now: f64) {
        let mut state = self.inner.lock();
        state.timing.mark_start(now);
        if state.phase == Phase::Pending {
            state.phase = Phase::Active;
        }
    }

    /// Move to Completed. Returns `false` if the request was already
    /// completed, in which case nothing must be emitted again.
    pub fn complete(&self) -> bool {
        let mut state = self.inner.lock();
        if state.phase == Phase::Completed {
            return false;
        }
        state.phase = Phase::Completed;
        true
    }

    pub fn record_db_time(&self, delta: f64) {
        self.inner.lock().timing.record_db_time(delta);
    }

    pub fn timing(&self) -> RequestTiming {
        self.inner.lock().timing
    }

    pub fn snapshot(&self, now: f64) -> TimingSnapshot {
        self.inner.lock().timing.snapshot(now)
    }

    /// Record the logical endpoint (`"<controller>.<action>"`) the request
    /// was routed to.
    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        self.inner.lock().endpoint = Some(endpoint.into());
    }

    pub fn endpoint(&self) -> Option<String> {
        self.inner.lock().endpoint.clone()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_once() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.phase(), Phase::Pending);

        ctx.activate(1.0);
        assert_eq!(ctx.phase(), Phase::Active);

        assert!(ctx.complete());
        assert_eq!(ctx.phase(), Phase::Completed);
        assert!(!ctx.complete());

        ctx.activate(2.0);
        assert_eq!(ctx.phase(), Phase::Completed);
    }

    #[test]
    fn clones_share_state() {
        let ctx = RequestContext::new();
        let other = ctx.clone();
        other.record_db_time(2.0);
        other.set_endpoint("users.show");
        assert_eq!(ctx.timing().db_time(), Some(2.0));
        assert_eq!(ctx.endpoint().as_deref(), Some("users.show"));
    }

    #[test]
    fn current_only_inside_scope() {
        assert!(RequestContext::current().is_none());

        let ctx = RequestContext::new();
        ctx.sync_scope(|| {
            let current = RequestContext::current().expect("context installed");
            current.record_db_time(1.0);
        });

        assert!(RequestContext::current().is_none());
        assert_eq!(ctx.timing().db_time(), Some(1.0));
    }

    #[tokio::test]
    async fn async_scope_installs_context() {
        let ctx = RequestContext::new();
        ctx.scope(async {
            tokio::task::yield_now().await;
            RequestContext::current()
                .expect("context installed")
                .set_endpoint("home.index");
        })
        .await;
        assert_eq!(ctx.endpoint().as_deref(), Some("home.index"));
    }

    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_context() {
        let ctx = RequestContext::new();
        let seen = ctx
            .scope(async {
                tokio::spawn(async { RequestContext::current().is_some() })
                    .await
                    .expect("task joined")
            })
            .await;
        assert!(!seen);
    }
}
