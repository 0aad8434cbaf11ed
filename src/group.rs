//! Group Registry
//!
//! Named groups with ordered, duplicate-free member lists. Membership is by
//! display name, not by connection. Groups are never deleted: once a name has
//! been created it stays listed, even with zero members, until the process
//! exits.

use std::collections::HashMap;

/// A named group
#[derive(Debug, Clone)]
pub struct Group {
    /// Group name (case-sensitive)
    pub name: String,
    /// Member display names in first-insertion order
    members: Vec<String>,
}

impl Group {
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: Vec::new(),
        }
    }

    /// Check if a display name is a member (exact match)
    fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    /// Append a member
    ///
    /// Returns false if the name was already present.
    pub fn add_member(&mut self, member: &str) -> bool {
        if self.contains(member) {
            false
        } else {
            self.members.push(member.to_string());
            true
        }
    }

    /// Remove a member, preserving the order of the rest
    ///
    /// Returns true if the name was present.
    pub fn remove_member(&mut self, member: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != member);
        self.members.len() != before
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }
}

/// All groups, in creation order
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    /// Group name -> position in `groups`
    index: HashMap<String, usize>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty group unless one with this name exists
    ///
    /// Returns true if the group already existed.
    pub fn ensure_group(&mut self, name: &str) -> bool {
        if self.index.contains_key(name) {
            return true;
        }
        self.index.insert(name.to_string(), self.groups.len());
        self.groups.push(Group::new(name.to_string()));
        false
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Add `member` to an existing group
    ///
    /// Unknown groups are left alone. Returns true only if the member list
    /// changed.
    pub fn add_member(&mut self, member: &str, group_name: &str) -> bool {
        match self.group_mut(group_name) {
            Some(group) => group.add_member(member),
            None => false,
        }
    }

    /// Remove `member` from every group
    ///
    /// Returns the names of the groups whose membership changed, in creation
    /// order.
    pub fn remove_member_everywhere(&mut self, member: &str) -> Vec<String> {
        self.groups
            .iter_mut()
            .filter_map(|group| group.remove_member(member).then(|| group.name.clone()))
            .collect()
    }

    pub fn list_group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    /// Member names of a group, or empty if the group is unknown
    pub fn members_of(&self, group_name: &str) -> Vec<String> {
        self.group(group_name)
            .map(|g| g.members().to_vec())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        let i = *self.index.get(name)?;
        self.groups.get_mut(i)
    }
}
