//! Connection struct definition
//!
//! Represents one live transport session: its outbound channel and the
//! groups it is associated with for group-scoped delivery.

use std::collections::HashSet;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Connected session information
///
/// Group association here is transport-level routing state, separate from
/// the name-based member lists kept by the group registry.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Server → Client message channel
    sender: mpsc::Sender<ServerMessage>,
    /// Groups whose scoped messages reach this connection
    groups: HashSet<String>,
}

impl Connection {
    /// Create a new connection with the given ID and sender channel
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            sender,
            groups: HashSet::new(),
        }
    }

    /// Queue a message for this connection without waiting
    ///
    /// Fails if the channel is closed (connection gone) or full (recipient
    /// too slow). Callers skip the recipient either way.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Associate this connection with a group
    ///
    /// Returns false if it was already associated.
    pub fn join(&mut self, group: &str) -> bool {
        self.groups.insert(group.to_string())
    }

    /// Check if this connection receives messages scoped to `group`
    pub fn is_in(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
