//! Connection hub
//!
//! The delivery surface the router works against: unicast, broadcast with an
//! optional excluded connection, and group-scoped broadcast. Every send is
//! best-effort; a failed recipient is logged and skipped.

use std::collections::HashMap;

use tracing::warn;

use crate::connection::Connection;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// All live connections: ConnectionId -> Connection
#[derive(Debug, Default)]
pub struct ConnectionHub {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connection: Connection) {
        self.connections.insert(connection.id, connection);
    }

    /// Drop a connection along with its group associations
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Associate a connection with a group so group-scoped sends reach it
    ///
    /// Returns false if the connection is unknown.
    pub fn associate(&mut self, connection_id: &ConnectionId, group: &str) -> bool {
        match self.connections.get_mut(connection_id) {
            Some(connection) => {
                connection.join(group);
                true
            }
            None => false,
        }
    }

    /// Connections associated with a group
    pub fn connections_in(&self, group: &str) -> Vec<ConnectionId> {
        self.connections
            .values()
            .filter(|c| c.is_in(group))
            .map(|c| c.id)
            .collect()
    }

    /// Send to one connection. Returns true if the message was queued.
    pub fn send_to(&self, connection_id: &ConnectionId, msg: ServerMessage) -> bool {
        match self.connections.get(connection_id) {
            Some(connection) => deliver(connection, msg),
            None => false,
        }
    }

    /// Send to every connection except `exclude`
    ///
    /// Returns the number of recipients the message was queued for.
    pub fn broadcast_except(&self, exclude: Option<ConnectionId>, msg: &ServerMessage) -> usize {
        self.connections
            .values()
            .filter(|c| Some(c.id) != exclude)
            .filter(|c| deliver(c, msg.clone()))
            .count()
    }

    /// Send to every connection associated with `group`, sender included
    pub fn broadcast_to_group(&self, group: &str, msg: &ServerMessage) -> usize {
        self.connections_in(group)
            .iter()
            .filter(|id| self.send_to(id, msg.clone()))
            .count()
    }
}

fn deliver(connection: &Connection, msg: ServerMessage) -> bool {
    match connection.send(msg) {
        Ok(()) => true,
        Err(e) => {
            warn!("Dropping message for {}: {}", connection.id, e);
            false
        }
    }
}
