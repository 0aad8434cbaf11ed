//! Error types for the relay
//!
//! Nothing here is ever reported to clients: `AppError` ends a single
//! connection (or startup), `SendError` marks one failed delivery during
//! fan-out.

use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Invalid startup configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Message send errors
///
/// Occurs when a recipient's outbound channel can't take a message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The recipient is not draining its queue fast enough
    #[error("Channel full")]
    ChannelFull,
}
