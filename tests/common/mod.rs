//! Shared utilities for integration tests.

use std::io;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use lograge_axum::config::LogrageConfig;
use lograge_axum::{AccessLog, HttpServer, MemorySink};
use tracing_subscriber::fmt::MakeWriter;

/// Demo router wired to an in-memory sink.
#[allow(dead_code)]
pub fn demo_app() -> (Router, Arc<MemorySink>) {
    demo_app_with(LogrageConfig::default())
}

#[allow(dead_code)]
pub fn demo_app_with(config: LogrageConfig) -> (Router, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let access_log = AccessLog::new().with_sink(sink.clone());
    let server = HttpServer::new(config, access_log);
    (server.router(), sink)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Host", "localhost:8080")
        .body(Body::empty())
        .unwrap()
}

/// Collects everything a `fmt` subscriber writes.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct BufferWriter(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl BufferWriter {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).expect("every line is JSON"))
            .collect()
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
