//! Basic type definitions for the relay
//!
//! `ConnectionId` is the opaque, transport-assigned identifier of one
//! WebSocket session. It is never reused and never persisted.

use uuid::Uuid;

/// Display name used when a connection acts before registering a username
pub const ANONYMOUS_NAME: &str = "Unknown";

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 so it can't be confused with display names or group names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_connection_id_display_is_uuid() {
        let id = ConnectionId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }
}
