//! Booking Gateway (v1)
//!
//! A stateless gateway built with Tokio, Axum and reqwest, sitting between a
//! public booking front-end and a single unreliable upstream endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────────┐
//!                         │                  BOOKING GATEWAY                  │
//!                         │                                                   │
//!     Client Request      │  ┌──────────┐   ┌──────────┐   ┌──────────────┐   │
//!     ────────────────────┼─▶│  http    │──▶│ access   │──▶│   action     │   │
//!                         │  │  server  │   │ policy   │   │   router     │   │
//!                         │  └──────────┘   └──────────┘   └──────┬───────┘   │
//!                         │                                       │           │
//!                         │                                       ▼           │
//!     Client Response     │  ┌──────────┐   ┌──────────┐   ┌──────────────┐   │
//!     ◀───────────────────┼──│ response │◀──│classifier│◀──│  bounded     │◀──┼── Upstream
//!                         │  │ shaping  │   │          │   │  caller      │   │
//!                         │  └──────────┘   └──────────┘   └──────────────┘   │
//!                         │                                                   │
//!                         │  config · lifecycle · observability               │
//!                         └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use booking_gateway::config::load_config;
use booking_gateway::http::HttpServer;
use booking_gateway::lifecycle::{signals, Shutdown};
use booking_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "booking-gateway")]
#[command(about = "Gateway between the booking front-end and its upstream", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration first: the log level lives in it.
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("booking-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_timeout_ms = config.upstream.timeout_ms,
        request_timeout_secs = config.timeouts.request_secs,
        allowed_origins = config.access.allowed_origins.len(),
        passthrough_unknown_actions = config.routing.passthrough_unknown_actions,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
