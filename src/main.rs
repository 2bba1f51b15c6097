//! Line chat server - Entry Point
//!
//! Parses arguments, binds the TCP listener and serves clients.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use line_chat::{ChatServer, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=line_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("line_chat=info")),
        )
        .init();

    // Binding is the only failure that stops the process
    ChatServer::new(Config::parse()).run().await?;
    Ok(())
}
