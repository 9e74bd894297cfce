//! JSON lines produced through the tracing subscriber.

use axum::http::StatusCode;
use lograge_axum::config::LogrageConfig;
use lograge_axum::{AccessLog, HttpServer, LogrageFormat};
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing::Level;

mod common;

use common::BufferWriter;

fn subscriber(writer: BufferWriter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .event_format(LogrageFormat::new())
        .with_writer(writer)
        .finish()
}

fn access_lines(writer: &BufferWriter) -> Vec<Value> {
    writer
        .json_lines()
        .into_iter()
        .filter(|line| line.get("method").is_some())
        .collect()
}

#[tokio::test]
async fn writes_one_json_line_per_request() {
    let writer = BufferWriter::default();
    let _guard = tracing::subscriber::set_default(subscriber(writer.clone()));

    let app = HttpServer::new(LogrageConfig::default(), AccessLog::new()).router();
    let response = app.oneshot(common::get("/test?a=1&a=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let lines = access_lines(&writer);
    assert_eq!(lines.len(), 1);
    let line = lines[0].as_object().unwrap();

    assert_eq!(line.len(), 16);
    assert_eq!(line["method"], "GET");
    assert_eq!(line["path"], "/test");
    assert_eq!(line["status"], 200);
    assert_eq!(line["controller"], "demo");
    assert_eq!(line["action"], "test");
    assert_eq!(line["params"], json!({"a": ["1", "2"]}));
    assert_eq!(line["host"], "localhost");
    assert!(line["duration"].is_number());
    assert!(line["db"].is_null());
    assert!(line["view"].is_null());
    assert!(line["exception"].is_null());
    assert!(line["exception_object"].is_null());
    assert_eq!(line["severity"], "INFO");
    assert_eq!(line["message"], "[200] GET /test (demo#test)");
    assert!(line["@timestamp"].is_string());
}

#[tokio::test]
async fn panic_line_is_error() {
    let writer = BufferWriter::default();
    let _guard = tracing::subscriber::set_default(subscriber(writer.clone()));

    let app = HttpServer::new(LogrageConfig::default(), AccessLog::new()).router();
    app.oneshot(common::get("/boom")).await.unwrap();

    let lines = access_lines(&writer);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["severity"], "ERROR");
    assert_eq!(lines[0]["status"], 500);
    assert_eq!(lines[0]["exception_object"], "panic");
    assert_eq!(lines[0]["exception"], "boom");
}

#[test]
fn plain_events_keep_only_recognized_fields() {
    let writer = BufferWriter::default();
    tracing::subscriber::with_default(subscriber(writer.clone()), || {
        tracing::info!(status = 201u64, duration = 1.5, user = "alice", "hello");
    });

    let lines = writer.json_lines();
    assert_eq!(lines.len(), 1);
    let line = lines[0].as_object().unwrap();
    assert_eq!(line["status"], 201);
    assert_eq!(line["duration"], 1.5);
    assert_eq!(line["message"], "hello");
    assert_eq!(line["severity"], "INFO");
    assert!(line.get("user").is_none());
    assert_eq!(line.len(), 5);
}
