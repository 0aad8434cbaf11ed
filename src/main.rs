//! Group Relay - Entry Point
//!
//! Starts the TCP listener and ChatServer actor, accepting connections.

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use group_relay::{serve, AppError, ChatServer, Config};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=group_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("group_relay=info")),
        )
        .init();

    let config = Config::from_env()?;

    let listener = TcpListener::bind(&config.addr).await?;
    info!("Group Relay listening on {}", config.addr);

    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    tokio::spawn(ChatServer::new(cmd_rx).run());

    info!("ChatServer actor started");

    serve(listener, cmd_tx, config.outbound_buffer).await;

    Ok(())
}
