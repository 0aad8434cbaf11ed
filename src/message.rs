//! Message protocol definitions
//!
//! Every frame is a JSON object `{"event": ..., "data": ...}`. Serde's
//! adjacently tagged enums keep the event names and payload shapes stable,
//! including bare-string payloads such as `create_group`.

use serde::{Deserialize, Serialize};

/// Client → Server message
///
/// Disconnect is not a frame; the handler raises it when the socket ends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Global chat message, also registers the sender's username
    SendMessage { username: String, message: String },
    /// Create a group (or join it if it already exists)
    CreateGroup(String),
    /// Join an existing group
    JoinGroup(String),
    /// Message scoped to one group
    GroupMessage {
        #[serde(rename = "roomId")]
        room_id: String,
        message: String,
    },
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Welcome text, unicast on connect
    Message(String),
    /// Global chat message from another connection
    Broadcast { username: String, message: String },
    /// All known group names, in creation order
    UpdateGroupsList(Vec<String>),
    /// Members of one group, in join order
    UpdateMembersList(Vec<String>),
    /// Message delivered to a group
    ReceiveGroupMessage { sender: String, message: String },
}
