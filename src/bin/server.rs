//! CoveKV Server Binary
//!
//! Starts the TCP server for CoveKV.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use covekv::network::Server;
use covekv::store::Registry;
use covekv::Config;

/// CoveKV Server
#[derive(Parser, Debug)]
#[command(name = "covekv-server")]
#[command(about = "In-memory key-value cache server with per-peer key spaces")]
#[command(version)]
struct Args {
    /// Directory snapshot files are written to
    #[arg(short, long, default_value = "./covekv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,covekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("CoveKV Server v{}", covekv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .build();

    let registry = match Registry::open(&config.data_dir) {
        Ok(registry) => Arc::new(registry),
        Err(err) => {
            tracing::error!("Failed to open registry: {}", err);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(&config, registry).await {
        Ok(server) => server,
        Err(err) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, err);
            std::process::exit(1);
        }
    };

    if let Err(err) = server.serve().await {
        tracing::error!("Server error: {}", err);
        std::process::exit(1);
    }
}
