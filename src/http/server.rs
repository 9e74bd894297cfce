//! Demo HTTP server.
//!
//! # Responsibilities
//! - Build an axum Router whose routes cover every access-log path
//!   (success, 404, client error, application failure, panic)
//! - Name each route's endpoint for controller/action resolution
//! - Run timed fake queries against an in-memory table; the single demo
//!   connection is checked out for the whole query so queries never overlap
//! - Serve until the shutdown future resolves

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::timeout::TimeoutLayer;

use crate::access::AccessLog;
use crate::config::LogrageConfig;
use crate::db::{QueryTimer, TimedConnection};
use crate::http::middleware::endpoint;
use crate::http::response::Failure;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    users: Arc<Mutex<TimedConnection<BTreeMap<u64, String>>>>,
    query_timer: QueryTimer,
    query_delay: Duration,
}

impl AppState {
    pub fn new(query_timer: QueryTimer, query_delay: Duration) -> Self {
        let users = BTreeMap::from([
            (1, "alice".to_string()),
            (2, "bob".to_string()),
            (3, "mallory".to_string()),
        ]);
        Self {
            users: Arc::new(Mutex::new(TimedConnection::new(users))),
            query_timer,
            query_delay,
        }
    }

    async fn find_user(&self, id: u64) -> Option<String> {
        // Time spent waiting for the connection is not db time.
        let conn = self.users.lock().await;
        self.query_timer
            .instrument(conn.queries(), async {
                tokio::time::sleep(self.query_delay).await;
                conn.get(&id).cloned()
            })
            .await
    }
}

/// Demo HTTP server with access logging installed.
pub struct HttpServer {
    router: Router,
    config: LogrageConfig,
}

impl HttpServer {
    pub fn new(config: LogrageConfig, access_log: AccessLog) -> Self {
        let state = AppState::new(
            access_log.query_timer(),
            Duration::from_millis(config.server.query_delay_ms),
        );
        let router = Self::build_router(&config, state, &access_log);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &LogrageConfig, state: AppState, access_log: &AccessLog) -> Router {
        let routes = Router::new()
            .route("/", get(index).layer(endpoint("home.index")))
            .route("/test", get(test).layer(endpoint("demo.test")))
            .route("/users/{id}", get(show_user).layer(endpoint("users.show")))
            .route("/teapot", get(teapot).layer(endpoint("demo.teapot")))
            .route("/locked/{id}", get(locked).layer(endpoint("users.locked")))
            .route("/boom", get(boom).layer(endpoint("demo.boom")))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )));

        access_log.init_app(routes)
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &LogrageConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct User {
    id: u64,
    name: String,
}

/// Errors the demo handlers map to responses.
#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("user {0} is locked")]
    Locked(u64),
}

impl IntoResponse for DemoError {
    fn into_response(self) -> Response {
        let status = match self {
            DemoError::Locked(_) => StatusCode::CONFLICT,
        };
        let failure = Failure::from_error(&self).with_code(status.as_u16());
        let mut response = (status, self.to_string()).into_response();
        failure.attach(&mut response);
        response
    }
}

async fn index() -> &'static str {
    "ok"
}

async fn test() -> &'static str {
    "test"
}

async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>, StatusCode> {
    match state.find_user(id).await {
        Some(name) => Ok(Json(User { id, name })),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn teapot() -> StatusCode {
    StatusCode::IM_A_TEAPOT
}

async fn locked(State(state): State<AppState>, Path(id): Path<u64>) -> Result<String, DemoError> {
    match state.find_user(id).await {
        Some(name) if name != "mallory" => Ok(name),
        _ => Err(DemoError::Locked(id)),
    }
}

async fn boom() -> &'static str {
    panic!("boom")
}
