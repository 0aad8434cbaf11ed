//! Fan-out rules
//!
//! Decides who receives each outbound event. State changes are handled by the
//! server before these are called; the router only reads the registries.
//!
//! Notifications are coarse on purpose: every update carries the full list,
//! never a diff.

use tracing::debug;

use crate::group::GroupRegistry;
use crate::hub::ConnectionHub;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Global chat message to every connection except the sender
pub fn global_message(
    hub: &ConnectionHub,
    sender: ConnectionId,
    username: String,
    message: String,
) -> usize {
    let msg = ServerMessage::Broadcast { username, message };
    let delivered = hub.broadcast_except(Some(sender), &msg);
    debug!("Broadcast from {} reached {} connections", sender, delivered);
    delivered
}

/// Full group-name list to every connection
pub fn groups_list(hub: &ConnectionHub, groups: &GroupRegistry) -> usize {
    let msg = ServerMessage::UpdateGroupsList(groups.list_group_names());
    hub.broadcast_except(None, &msg)
}

/// Member list of one group to the connections associated with it
pub fn members_list(hub: &ConnectionHub, groups: &GroupRegistry, group: &str) -> usize {
    let msg = ServerMessage::UpdateMembersList(groups.members_of(group));
    let delivered = hub.broadcast_to_group(group, &msg);
    debug!("Members of '{}' sent to {} connections", group, delivered);
    delivered
}

/// Member list of every group, each to its own connections
pub fn all_members_lists(hub: &ConnectionHub, groups: &GroupRegistry) -> usize {
    groups
        .list_group_names()
        .iter()
        .map(|group| members_list(hub, groups, group))
        .sum()
}

/// Group-scoped chat message, delivered to the sender too
pub fn group_message(hub: &ConnectionHub, group: &str, sender: String, message: String) -> usize {
    let msg = ServerMessage::ReceiveGroupMessage { sender, message };
    let delivered = hub.broadcast_to_group(group, &msg);
    debug!("Group message to '{}' reached {} connections", group, delivered);
    delivered
}
