//! The snapshot codec: serializing the whole tree to a single portable
//! string and rebuilding a tree from one.
//!
//! The wire form is base64 over a JSON document holding the tree plus the
//! symlink side-table. Symlinks travel flattened: their live copies are
//! replaced by small designator files and re-realized on import from the
//! side-table, which stays authoritative. Mounts never travel at all; a
//! foreign filesystem is not serializable transitively, so export fully
//! unmounts first and the caller re-mounts after import.

use crate::filesystem::FileSystem;
use crate::node::Node;
use crate::{FsError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The payload written in place of a symlink's live copy during export.
/// Ordinary readers never decode this themselves; import regenerates the
/// live copy from the side-table.
pub(crate) const SYMLINK_DESIGNATOR: &[u8] = b"$symlink$";

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SnapshotNode {
    Dir {
        children: BTreeMap<String, SnapshotNode>,
    },
    File {
        /// File bytes, base64-encoded for transport safety.
        data: String,
    },
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    root: SnapshotNode,
    symlinks: BTreeMap<String, String>,
}

fn freeze(node: &Node) -> Result<SnapshotNode> {
    match node {
        Node::Directory(children) => Ok(SnapshotNode::Dir {
            children: children
                .iter()
                .map(|(name, child)| Ok((name.clone(), freeze(child)?)))
                .collect::<Result<_>>()?,
        }),
        Node::File(data) => Ok(SnapshotNode::File {
            data: STANDARD.encode(data),
        }),
        // Export unmounts everything first; a placeholder surviving to
        // serialization means its side-table record was lost.
        Node::Mount(_) => Err(FsError::MountFailed),
    }
}

fn thaw(node: SnapshotNode) -> Result<Node> {
    match node {
        SnapshotNode::Dir { children } => Ok(Node::Directory(
            children
                .into_iter()
                .map(|(name, child)| Ok((name, thaw(child)?)))
                .collect::<Result<_>>()?,
        )),
        SnapshotNode::File { data } => Ok(Node::File(
            STANDARD
                .decode(data.as_bytes())
                .map_err(|_| FsError::InvalidSnapshot)?,
        )),
    }
}

impl FileSystem {
    /// Serializes the whole tree to a portable string.
    ///
    /// Recorded symlinks are flattened to designator files and recorded
    /// mounts are unmounted before serializing; the live tree keeps that
    /// flattened state. Mounts are not part of the snapshot.
    pub fn export(&self) -> Result<String> {
        let symlinks: Vec<String> = {
            let guard = self.inner.read().map_err(|_| FsError::Lock)?;
            guard.symlinks.keys().cloned().collect()
        };
        for target in &symlinks {
            self.remove_any(target)?;
            self.write_file(target, Some(SYMLINK_DESIGNATOR))?;
        }

        let mounts: Vec<String> = {
            let guard = self.inner.read().map_err(|_| FsError::Lock)?;
            guard.mounts.keys().cloned().collect()
        };
        for path in &mounts {
            self.unmount(path)?;
        }

        let guard = self.inner.read().map_err(|_| FsError::Lock)?;
        let snapshot = Snapshot {
            root: freeze(&guard.root)?,
            symlinks: guard.symlinks.clone(),
        };
        let json = serde_json::to_vec(&snapshot).map_err(|_| FsError::InvalidSnapshot)?;
        debug!(
            symlinks = symlinks.len(),
            unmounted = mounts.len(),
            bytes = json.len(),
            "exported snapshot",
        );

        Ok(STANDARD.encode(json))
    }

    /// Replaces this filesystem's tree with the one encoded in `snapshot`.
    ///
    /// The snapshot is rebuilt and its symlinks re-realized on a scratch
    /// tree first; `self` is only swapped once everything succeeded, so a
    /// malformed snapshot (`InvalidSnapshot`) leaves the current tree
    /// intact.
    pub fn import(&self, snapshot: &str) -> Result<()> {
        let json = STANDARD
            .decode(snapshot.as_bytes())
            .map_err(|_| FsError::InvalidSnapshot)?;
        let snapshot: Snapshot =
            serde_json::from_slice(&json).map_err(|_| FsError::InvalidSnapshot)?;

        let root = thaw(snapshot.root)?;
        if !matches!(root, Node::Directory(_)) {
            return Err(FsError::InvalidSnapshot);
        }

        let staged = FileSystem::default();
        {
            let mut guard = staged.inner.write().map_err(|_| FsError::Lock)?;
            guard.root = root;
            guard.symlinks = snapshot.symlinks.clone();
        }

        // Re-realize every recorded symlink from its designator file.
        for (target, source) in &snapshot.symlinks {
            match staged.read_file(target) {
                Ok(data) if data == SYMLINK_DESIGNATOR => {}
                _ => return Err(FsError::InvalidSnapshot),
            }
            staged.remove_any(target)?;
            staged
                .symlink(source, target)
                .map_err(|_| FsError::InvalidSnapshot)?;
        }

        let mut incoming = staged.inner.write().map_err(|_| FsError::Lock)?;
        let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;
        // Whether *this* filesystem is mounted somewhere is not a property
        // of the imported tree.
        let mounted = guard.mounted;
        *guard = std::mem::take(&mut *incoming);
        guard.mounted = mounted;
        debug!(symlinks = guard.symlinks.len(), "imported snapshot");

        Ok(())
    }
}
