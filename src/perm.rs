//! The user/group registry carried alongside a filesystem.
//!
//! Bookkeeping only: nothing in the operation layer consults it, and no
//! enforcement semantics are defined. It records users, their group
//! memberships, numeric group ids, and group ownership tags for files and
//! folders, seeded with the `root` user and group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type GroupId = u32;

/// A registered user and the groups they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRegistry {
    users: BTreeMap<String, UserRecord>,
    groups: BTreeMap<String, GroupId>,
    files: BTreeMap<String, GroupId>,
    folders: BTreeMap<String, GroupId>,
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        let mut registry = Self {
            users: BTreeMap::new(),
            groups: BTreeMap::new(),
            files: BTreeMap::new(),
            folders: BTreeMap::new(),
        };
        registry.add_group("root", 0);
        registry.add_user("root", ["root"]);

        registry
    }
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: impl Into<String>, id: GroupId) {
        self.groups.insert(name.into(), id);
    }

    pub fn add_user<I, S>(&mut self, name: impl Into<String>, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.insert(
            name.into(),
            UserRecord {
                groups: groups.into_iter().map(Into::into).collect(),
            },
        );
    }

    pub fn user(&self, name: &str) -> Option<&UserRecord> {
        self.users.get(name)
    }

    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.groups.get(name).copied()
    }

    pub fn tag_file(&mut self, path: impl Into<String>, group: GroupId) {
        self.files.insert(path.into(), group);
    }

    pub fn tag_folder(&mut self, path: impl Into<String>, group: GroupId) {
        self.folders.insert(path.into(), group);
    }

    pub fn file_group(&self, path: &str) -> Option<GroupId> {
        self.files.get(path).copied()
    }

    pub fn folder_group(&self, path: &str) -> Option<GroupId> {
        self.folders.get(path).copied()
    }
}

#[cfg(test)]
mod test_perm {
    use super::*;

    #[test]
    fn test_seeded_with_root() {
        let registry = PermissionRegistry::new();

        assert_eq!(registry.group_id("root"), Some(0));
        assert_eq!(
            registry.user("root").unwrap().groups,
            ["root"],
            "root belongs to the root group",
        );
    }

    #[test]
    fn test_registration_and_tags() {
        let mut registry = PermissionRegistry::new();
        registry.add_group("staff", 50);
        registry.add_user("alex", ["staff", "root"]);
        registry.tag_file("/etc/passwd", 0);
        registry.tag_folder("/home/alex", 50);

        assert_eq!(registry.group_id("staff"), Some(50));
        assert_eq!(registry.user("alex").unwrap().groups, ["staff", "root"]);
        assert_eq!(registry.file_group("/etc/passwd"), Some(0));
        assert_eq!(registry.folder_group("/home/alex"), Some(50));
        assert_eq!(registry.user("nobody"), None);
    }
}
