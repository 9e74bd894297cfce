//! Lograge demo server.
//!
//! Serves a handful of routes with the access log installed so the JSON
//! output can be inspected:
//!
//! ```text
//! curl localhost:8080/test
//! {"@timestamp":"...","action":"test","controller":"demo","db":null,...}
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use lograge_axum::config::{load_config, LogrageConfig};
use lograge_axum::lifecycle::shutdown_signal;
use lograge_axum::observability::init_logging;
use lograge_axum::{AccessLog, HttpServer};

#[derive(Parser)]
#[command(name = "lograge-demo")]
#[command(about = "Demo server emitting lograge-style access logs", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LogrageConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    init_logging(&config.logging)?;

    tracing::debug!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        format = ?config.logging.format,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config, AccessLog::new());
    server.run(listener, shutdown_signal()).await?;

    Ok(())
}
