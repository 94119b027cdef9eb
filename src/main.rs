//! Mr. DLib widget proxy.
//!
//! Sits between a publisher's web page and the Mr. DLib recommendation
//! API.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                 WIDGET PROXY                  │
//!                     │                                               │
//!   Widget Request    │  ┌────────┐   ┌───────────────────────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│ /relay      → relay       │  │
//!                     │  │ server │   │ /recommend… → recommender │  │
//!                     │  └────────┘   │ /related    → legacy      │  │
//!                     │               └─────────────┬─────────────┘  │
//!                     │                             │                │
//!   Widget Response   │  ┌──────────┐               ▼                │
//!   ◀─────────────────┼──│ response │◀───── outbound HTTP call ──────┼──▶ target URL /
//!                     │  │ render   │      (sequential, ≤2 calls)    │    Mr. DLib API
//!                     │  └──────────┘                                │
//!                     │                                               │
//!                     │  cross-cutting: config · tracing · timeouts  │
//!                     └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mrdlib_proxy::config::{load_config, ProxyConfig};
use mrdlib_proxy::observability;
use mrdlib_proxy::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "mrdlib-proxy", about = "Widget proxy for Mr. DLib recommendations")]
struct Args {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    observability::logging::init(&config.observability);

    tracing::info!("mrdlib-proxy v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        deployment = %config.recommender.deployment,
        relay_mode = ?config.relay.mode,
        request_timeout_secs = config.timeouts.request_secs,
        ui = config.recommender.ui.as_deref().unwrap_or("-"),
        partner = config.recommender.partner.as_deref().unwrap_or("-"),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
