mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mcp::McpServer;
use warpcast::WarpcastClient;

use config::{Config, TOKEN_VAR};
use error::Result;

const SERVER_NAME: &str = "warpcast-mcp";

#[derive(Parser)]
#[command(name = "warpcast-mcp")]
#[command(about = "MCP server exposing Warpcast cast and channel tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Serve over HTTP instead of stdio
    #[arg(long)]
    http: bool,

    /// HTTP bind address [default: 0.0.0.0]
    #[arg(long)]
    host: Option<String>,

    /// HTTP port [default: 8000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    config.apply_flags(cli.host, cli.port);

    if !config.has_token() {
        tracing::warn!("{TOKEN_VAR} is not set; every tool call will fail until it is configured");
    }

    let client = Arc::new(WarpcastClient::new(config.client_config())?);
    tracing::info!(
        base_url = %client.base_url(),
        propagate_errors = client.config().propagate_errors,
        "warpcast client ready"
    );

    let registry = tools::registry(client)?;
    let server = Arc::new(McpServer::new(
        SERVER_NAME,
        env!("CARGO_PKG_VERSION"),
        Arc::new(registry),
    ));

    if cli.http {
        mcp::serve_http(server, &config.server.host, config.server.port).await?;
    } else {
        server.serve_stdio().await?;
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the stdio protocol.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}
