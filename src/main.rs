//! Rate-limited demonstration API server.

use std::path::PathBuf;
use clap::Parser;
use tokio::net::TcpListener;

use rate_limited_api::config::resolve_config;
use rate_limited_api::lifecycle::signals::forward_signals;
use rate_limited_api::observability::{logging, metrics};
use rate_limited_api::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "rate-limited-api")]
#[command(about = "Demonstration HTTP API behind a global rate limiter", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.bind)?;

    logging::init(&config.observability);
    tracing::info!("rate-limited-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        requests_per_second = config.rate_limit.requests_per_second,
        burst_size = config.rate_limit.burst_size,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    forward_signals(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
