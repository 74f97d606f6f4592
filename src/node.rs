//! The tree representation: a node is a directory, a file, or a mount
//! placeholder standing in for a foreign filesystem.

use crate::filesystem::FileSystem;
use crate::{FileType, Metadata};
use std::collections::BTreeMap;

/// A node in the tree.
///
/// The variant is the sole discriminator of the entry kind: a node is never
/// simultaneously a directory and a file. `Mount` is the structural
/// placeholder written at a mount point; the mounted filesystem keeps
/// ownership of its own tree, the placeholder only holds a handle to it.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Directory(BTreeMap<String, Node>),
    File(Vec<u8>),
    Mount(FileSystem),
}

impl Node {
    pub(crate) fn empty_dir() -> Self {
        Node::Directory(BTreeMap::new())
    }

    pub(crate) fn metadata(&self) -> Metadata {
        match self {
            Node::Directory(_) | Node::Mount(_) => Metadata {
                ft: FileType {
                    dir: true,
                    ..Default::default()
                },
                len: 0,
            },
            Node::File(data) => Metadata {
                ft: FileType {
                    file: true,
                    ..Default::default()
                },
                len: data.len() as u64,
            },
        }
    }
}
