//! gamehall API Server Binary

use clap::Parser;
use gamehall::api::ApiServer;
use gamehall::config::ConfigLoader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gamehall-api")]
#[command(about = "Multi-game wagering engine HTTP API", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Expire active sessions idle for this many seconds
    #[arg(long)]
    abandoned_ttl: Option<u64>,

    /// Opening balance for the in-memory wallet
    #[arg(long)]
    opening_balance: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(origins) = args.cors_origins {
        config.server.allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
    }
    if let Some(timeout) = args.timeout {
        config.server.request_timeout_secs = timeout;
    }
    if let Some(ttl) = args.abandoned_ttl {
        config.sessions.abandoned_ttl_secs = Some(ttl);
    }
    if let Some(balance) = args.opening_balance {
        config.wallet.opening_balance = balance;
    }
    config.validate()?;

    ApiServer::new(config).run().await
}
