//! Spense server binary
//!
//! Usage:
//!   spense-server                          Serve on 127.0.0.1:5000
//!   spense-server --port 8080 --no-auth    Local dev without auth

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spense_server::{serve, ServerConfig};

#[derive(Parser)]
#[command(name = "spense-server", about = "AI-assisted expense tracker API")]
struct Cli {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Disable the owner-identity requirement (local development only)
    #[arg(long)]
    no_auth: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = ServerConfig {
        require_auth: !cli.no_auth,
        ..ServerConfig::default()
    };

    serve(&cli.host, cli.port, config).await
}
