//! ChatServer Actor implementation
//!
//! The central actor that owns all relay state: the identity registry, the
//! group registry and the connection hub. Handlers talk to it only through
//! `ServerCommand`s, so each event's registry updates and the fan-out they
//! trigger happen without interleaving with any other event.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::group::GroupRegistry;
use crate::hub::ConnectionHub;
use crate::identity::IdentityRegistry;
use crate::message::ServerMessage;
use crate::router;
use crate::types::{ConnectionId, ANONYMOUS_NAME};

/// Welcome text unicast to every new connection
pub const WELCOME_MESSAGE: &str = "Welcome to the chat!";

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection opened
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Connection closed
    Disconnect {
        connection_id: ConnectionId,
    },
    /// Global message
    SendMessage {
        connection_id: ConnectionId,
        username: String,
        message: String,
    },
    /// Create a group, or join it if it exists
    CreateGroup {
        connection_id: ConnectionId,
        room_name: String,
    },
    /// Join an existing group
    JoinGroup {
        connection_id: ConnectionId,
        room_name: String,
    },
    /// Message scoped to one group
    GroupMessage {
        connection_id: ConnectionId,
        room_id: String,
        message: String,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// Connection -> display name
    identities: IdentityRegistry,
    /// Group name -> member names
    groups: GroupRegistry,
    /// Live connections and their group associations
    hub: ConnectionHub,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            identities: IdentityRegistry::new(),
            groups: GroupRegistry::new(),
            hub: ConnectionHub::new(),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        if !self.identities.is_empty() {
            debug!(
                "Dropping {} registered identities on shutdown",
                self.identities.len()
            );
        }
        info!("ChatServer shutting down");
    }

    /// Process a single command to completion
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                connection_id,
                sender,
            } => {
                self.handle_connect(connection_id, sender);
            }
            ServerCommand::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id);
            }
            ServerCommand::SendMessage {
                connection_id,
                username,
                message,
            } => {
                self.handle_send_message(connection_id, username, message);
            }
            ServerCommand::CreateGroup {
                connection_id,
                room_name,
            } => {
                self.handle_create_group(connection_id, room_name);
            }
            ServerCommand::JoinGroup {
                connection_id,
                room_name,
            } => {
                self.handle_join_group(connection_id, room_name);
            }
            ServerCommand::GroupMessage {
                connection_id,
                room_id,
                message,
            } => {
                self.handle_group_message(connection_id, room_id, message);
            }
        }
    }

    /// Handle new connection
    fn handle_connect(&mut self, connection_id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        info!("Connection {} opened", connection_id);
        self.hub.register(Connection::new(connection_id, sender));
        self.hub
            .send_to(&connection_id, ServerMessage::Message(WELCOME_MESSAGE.to_string()));
        self.log_totals();
    }

    /// Handle connection close: the full cleanup cascade
    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        if self.hub.unregister(&connection_id).is_none() {
            warn!("Disconnect for unknown connection {}", connection_id);
            return;
        }

        let name = self.display_name(&connection_id);
        info!("Connection {} ({}) disconnected", connection_id, name);

        let changed = self.groups.remove_member_everywhere(&name);
        if !changed.is_empty() {
            debug!("'{}' removed from groups {:?}", name, changed);
        }

        // Every group is refreshed, not just the ones that changed
        router::all_members_lists(&self.hub, &self.groups);

        if self.identities.remove(&connection_id).is_none() {
            debug!("Connection {} never registered a username", connection_id);
        }

        self.log_totals();
    }

    /// Handle global message
    fn handle_send_message(&mut self, connection_id: ConnectionId, username: String, message: String) {
        if !self.hub.contains(&connection_id) {
            return;
        }

        if self.identities.set_if_absent(connection_id, &username) {
            info!("Connection {} registered as '{}'", connection_id, username);
        } else if self.identities.get(&connection_id) != Some(username.as_str()) {
            warn!(
                "Connection {} tried to re-register as '{}', keeping '{}'",
                connection_id,
                username,
                self.display_name(&connection_id)
            );
        }

        router::global_message(&self.hub, connection_id, username, message);
    }

    /// Handle group creation
    fn handle_create_group(&mut self, connection_id: ConnectionId, room_name: String) {
        if !self.hub.contains(&connection_id) {
            return;
        }

        let name = self.display_name(&connection_id);

        if self.groups.ensure_group(&room_name) {
            debug!("Group '{}' already exists, joining", room_name);
        } else {
            info!("Connection {} created group '{}'", connection_id, room_name);
        }

        self.hub.associate(&connection_id, &room_name);
        self.groups.add_member(&name, &room_name);

        router::groups_list(&self.hub, &self.groups);
        router::members_list(&self.hub, &self.groups, &room_name);
    }

    /// Handle group joining
    fn handle_join_group(&mut self, connection_id: ConnectionId, room_name: String) {
        if !self.hub.contains(&connection_id) {
            return;
        }

        if !self.groups.contains_group(&room_name) {
            warn!(
                "Connection {} tried to join unknown group '{}'",
                connection_id, room_name
            );
            return;
        }

        let name = self.display_name(&connection_id);
        self.hub.associate(&connection_id, &room_name);
        self.groups.add_member(&name, &room_name);

        info!("Connection {} joined group '{}'", connection_id, room_name);

        router::members_list(&self.hub, &self.groups, &room_name);
    }

    /// Handle group message
    fn handle_group_message(&mut self, connection_id: ConnectionId, room_id: String, message: String) {
        if !self.hub.contains(&connection_id) {
            return;
        }

        let sender = self.display_name(&connection_id);
        router::group_message(&self.hub, &room_id, sender, message);
    }

    /// Registered name of a connection, or the anonymous placeholder
    fn display_name(&self, connection_id: &ConnectionId) -> String {
        self.identities
            .get(connection_id)
            .unwrap_or(ANONYMOUS_NAME)
            .to_string()
    }

    fn log_totals(&self) {
        debug!(
            "Total connections: {}, registered: {}, groups: {}",
            self.hub.len(),
            self.identities.len(),
            self.groups.len()
        );
    }
}
