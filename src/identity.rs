//! Identity Registry
//!
//! Maps a connection to the display name it first announced. The registry is
//! keyed by connection, so two connections may hold the same name.

use std::collections::HashMap;

use crate::types::ConnectionId;

/// Connection → display name mapping
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    names: HashMap<ConnectionId, String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `name` to the connection unless it already has one
    ///
    /// Returns true if the name was assigned. A repeat call, with the same or a
    /// different name, keeps the original.
    pub fn set_if_absent(&mut self, connection_id: ConnectionId, name: &str) -> bool {
        if self.names.contains_key(&connection_id) {
            return false;
        }
        self.names.insert(connection_id, name.to_string());
        true
    }

    /// Registered name, or None if the connection never sent a global
    /// message or has already disconnected
    pub fn get(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.names.get(connection_id).map(String::as_str)
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<String> {
        self.names.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_if_absent_keeps_first_name() {
        let mut registry = IdentityRegistry::new();
        let id = ConnectionId::new();

        assert!(registry.set_if_absent(id, "Alice"));
        assert!(!registry.set_if_absent(id, "Mallory"));
        assert!(!registry.set_if_absent(id, "Alice"));

        assert_eq!(registry.get(&id), Some("Alice"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_name_on_two_connections() {
        let mut registry = IdentityRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert!(registry.set_if_absent(a, "Alice"));
        assert!(registry.set_if_absent(b, "Alice"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_is_safe_when_absent() {
        let mut registry = IdentityRegistry::new();
        let id = ConnectionId::new();

        assert!(registry.get(&id).is_none());
        assert!(registry.remove(&id).is_none());

        registry.set_if_absent(id, "Alice");
        assert_eq!(registry.remove(&id).as_deref(), Some("Alice"));
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }
}
