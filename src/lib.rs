//! Group Relay Library
//!
//! A WebSocket message relay built with tokio-tungstenite. Connections announce
//! a display name, chat globally, and create or join named groups for scoped
//! conversations.
//!
//! # Features
//! - Global messages to every other connection
//! - Named groups created on first use, never deleted
//! - Ordered, duplicate-free member lists per group
//! - Group-scoped messages delivered to every associated connection
//! - Cleanup cascade on disconnect
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning both registries and the hub
//! - Each connection has a `handler` task communicating with the server
//! - Outbound delivery never waits on a slow recipient
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use group_relay::{serve, ChatServer, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(&config.addr).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
//!
//!     tokio::spawn(ChatServer::new(cmd_rx).run());
//!
//!     serve(listener, cmd_tx, config.outbound_buffer).await;
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod group;
pub mod handler;
pub mod hub;
pub mod identity;
pub mod message;
pub mod router;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use connection::Connection;
pub use error::{AppError, SendError};
pub use group::{Group, GroupRegistry};
pub use handler::{handle_connection, serve};
pub use hub::ConnectionHub;
pub use identity::IdentityRegistry;
pub use message::{ClientMessage, ServerMessage};
pub use server::{ChatServer, ServerCommand};
pub use types::{ConnectionId, ANONYMOUS_NAME};
