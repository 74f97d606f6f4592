//! This module contains the [`FileSystem`] type itself.

use crate::node::Node;
use crate::path;
use crate::{DirEntry, FsError, Metadata, ReadDir, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// The in-memory file system!
///
/// This `FileSystem` type can be cloned, it's a light copy of the
/// `FileSystemInner` (which is behind a `Arc` + `RwLock`): clones observe
/// and mutate the same tree.
///
/// All structural operations are synchronous and run to completion; by the
/// time one returns, the tree is fully updated or untouched. No operation
/// mutates anything before its checks have passed.
#[derive(Clone, Default)]
pub struct FileSystem {
    pub(crate) inner: Arc<RwLock<FileSystemInner>>,
}

/// The core of the file system: the root directory plus the root
/// side-tables for mounts and symlinks.
pub(crate) struct FileSystemInner {
    /// Always a `Node::Directory`.
    pub(crate) root: Node,
    /// Mount path (canonical) to the mounted filesystem. The in-tree
    /// `Node::Mount` placeholder is a cache of this table.
    pub(crate) mounts: BTreeMap<String, FileSystem>,
    /// Symlink target path to source path, both canonical. The copied node
    /// at the target is a write-time snapshot, not live indirection.
    pub(crate) symlinks: BTreeMap<String, String>,
    /// Set while this filesystem is mounted inside another one.
    pub(crate) mounted: bool,
}

impl Default for FileSystemInner {
    fn default() -> Self {
        Self {
            root: Node::empty_dir(),
            mounts: BTreeMap::new(),
            symlinks: BTreeMap::new(),
            mounted: false,
        }
    }
}

/// The outcome of walking a path: either a node of this tree, or a redirect
/// into a mounted filesystem with the unconsumed tail of the path.
pub(crate) enum Resolution<'a> {
    Found(&'a Node),
    Redirect(FileSystem, String),
}

/// Like [`Resolution`], but for the *parent* directory of the final
/// segment, held mutably for an insertion or a removal.
pub(crate) enum DirRef<'a> {
    Found(&'a mut BTreeMap<String, Node>),
    Redirect(FileSystem, String),
}

enum KindCheck {
    File,
    Directory,
    /// Suppresses the kind precondition; used by link-management cleanup to
    /// detach an entry of unknown or mismatched kind.
    Any,
}

impl FileSystemInner {
    /// Walks `segments` from the root, left to right. Every segment but the
    /// last must name a directory: a missing entry is `EntryNotFound`, a
    /// file in the way is `NotADirectory`. Hitting a mount placeholder
    /// yields a redirect carrying the rest of the path.
    pub(crate) fn resolve(&self, segments: &[String]) -> Result<Resolution<'_>> {
        let mut node = &self.root;

        for (depth, segment) in segments.iter().enumerate() {
            node = match node {
                Node::Directory(children) => {
                    children.get(segment).ok_or(FsError::EntryNotFound)?
                }
                Node::Mount(fs) => {
                    return Ok(Resolution::Redirect(
                        fs.clone(),
                        path::render_posix(&segments[depth..]),
                    ));
                }
                Node::File(_) => return Err(FsError::NotADirectory),
            };
        }

        Ok(Resolution::Found(node))
    }

    /// Resolves the parent directory of the final segment of `segments`,
    /// which must be non-empty. The final segment itself is not required to
    /// exist.
    fn dir_of_parent_mut(&mut self, segments: &[String]) -> Result<DirRef<'_>> {
        let last = segments.len() - 1;
        let mut node = &mut self.root;

        for (depth, segment) in segments[..last].iter().enumerate() {
            node = match node {
                Node::Directory(children) => {
                    children.get_mut(segment).ok_or(FsError::EntryNotFound)?
                }
                Node::Mount(fs) => {
                    return Ok(DirRef::Redirect(
                        fs.clone(),
                        path::render_posix(&segments[depth..]),
                    ));
                }
                Node::File(_) => return Err(FsError::NotADirectory),
            };
        }

        match node {
            Node::Directory(children) => Ok(DirRef::Found(children)),
            Node::Mount(fs) => Ok(DirRef::Redirect(
                fs.clone(),
                path::render_posix(&segments[last..]),
            )),
            Node::File(_) => Err(FsError::NotADirectory),
        }
    }

    /// The walk behind `create_dir_all`: creates every missing directory
    /// along the way. Returns the redirect to continue in, if a mount was
    /// crossed.
    fn create_dir_all_inner(
        &mut self,
        segments: &[String],
    ) -> Result<Option<(FileSystem, String)>> {
        let mut node = &mut self.root;

        for (depth, segment) in segments.iter().enumerate() {
            node = match node {
                Node::Directory(children) => {
                    if let Some(Node::File(_)) = children.get(segment) {
                        return Err(FsError::NotADirectory);
                    }

                    children
                        .entry(segment.clone())
                        .or_insert_with(Node::empty_dir)
                }
                Node::Mount(fs) => {
                    return Ok(Some((
                        fs.clone(),
                        path::render_posix(&segments[depth..]),
                    )));
                }
                Node::File(_) => return Err(FsError::NotADirectory),
            };
        }

        Ok(None)
    }
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entry exists at `path`. Never fails: malformed paths and
    /// traversal errors all report `false`.
    pub fn exists(&self, path: &str) -> bool {
        self.metadata(path).is_ok()
    }

    /// The metadata of the entry at `path`. The root is always a directory.
    pub fn metadata(&self, path: &str) -> Result<Metadata> {
        let segments = path::parse(path)?;
        let guard = self.inner.read().map_err(|_| FsError::Lock)?;

        match guard.resolve(&segments)? {
            Resolution::Found(node) => Ok(node.metadata()),
            Resolution::Redirect(fs, rest) => {
                drop(guard);
                fs.metadata(&rest)
            }
        }
    }

    /// The raw bytes of the file at `path`.
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let segments = path::parse(path)?;
        let guard = self.inner.read().map_err(|_| FsError::Lock)?;

        match guard.resolve(&segments)? {
            Resolution::Found(Node::File(data)) => Ok(data.clone()),
            Resolution::Found(_) => Err(FsError::IsADirectory),
            Resolution::Redirect(fs, rest) => {
                drop(guard);
                fs.read_file(&rest)
            }
        }
    }

    /// The content of the file at `path`, decoded as UTF-8.
    pub fn read_file_to_string(&self, path: &str) -> Result<String> {
        String::from_utf8(self.read_file(path)?).map_err(|_| FsError::InvalidData)
    }

    /// The immediate children of the directory at `path`, sorted by name.
    pub fn read_dir(&self, path: &str) -> Result<ReadDir> {
        let segments = path::parse(path)?;
        let guard = self.inner.read().map_err(|_| FsError::Lock)?;

        match guard.resolve(&segments)? {
            Resolution::Found(Node::Directory(children)) => {
                let data = children
                    .iter()
                    .map(|(name, node)| DirEntry {
                        name: name.clone(),
                        metadata: node.metadata(),
                    })
                    .collect();

                Ok(ReadDir::new(data))
            }
            Resolution::Found(Node::Mount(fs)) => {
                let fs = fs.clone();
                drop(guard);
                fs.read_dir("/")
            }
            Resolution::Found(Node::File(_)) => Err(FsError::NotADirectory),
            Resolution::Redirect(fs, rest) => {
                drop(guard);
                fs.read_dir(&rest)
            }
        }
    }

    /// Creates the directory at `path`. The parent must already exist; the
    /// target must not.
    pub fn create_dir(&self, path: &str) -> Result<()> {
        let segments = path::parse(path)?;
        let Some((name, _)) = segments.split_last() else {
            // The root always exists.
            return Err(FsError::AlreadyExists);
        };
        let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;

        match guard.dir_of_parent_mut(&segments)? {
            DirRef::Found(children) => match children.get(name) {
                Some(Node::File(_)) => Err(FsError::NotADirectory),
                Some(_) => Err(FsError::AlreadyExists),
                None => {
                    children.insert(name.clone(), Node::empty_dir());
                    Ok(())
                }
            },
            DirRef::Redirect(fs, rest) => {
                drop(guard);
                fs.create_dir(&rest)
            }
        }
    }

    /// Creates the directory at `path` along with every missing ancestor.
    /// Existing directories on the way are left alone; an existing file on
    /// the way is `NotADirectory`.
    pub fn create_dir_all(&self, path: &str) -> Result<()> {
        let segments = path::parse(path)?;
        let redirect = {
            let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;
            guard.create_dir_all_inner(&segments)?
        };

        match redirect {
            Some((fs, rest)) => fs.create_dir_all(&rest),
            None => Ok(()),
        }
    }

    /// Creates or overwrites the file at `path`.
    ///
    /// The content is required: `None` is rejected with `MissingContent`. A
    /// zero-length file is written with `Some(&[])`, keeping the "no
    /// content" failure distinguishable from an intentionally empty write.
    pub fn write_file<C: AsRef<[u8]>>(&self, path: &str, contents: Option<C>) -> Result<()> {
        let contents = contents.ok_or(FsError::MissingContent)?;

        self.write_node(path, Node::File(contents.as_ref().to_vec()))
    }

    /// Places an already-built node at `path`, bypassing content handling.
    /// This is the raw write behind `write_file`, `mount` and `symlink`.
    pub(crate) fn write_node(&self, path: &str, node: Node) -> Result<()> {
        let segments = path::parse(path)?;
        let Some((name, _)) = segments.split_last() else {
            return Err(FsError::IsADirectory);
        };
        let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;

        match guard.dir_of_parent_mut(&segments)? {
            DirRef::Found(children) => match children.get(name) {
                Some(Node::Directory(_) | Node::Mount(_)) => Err(FsError::IsADirectory),
                _ => {
                    children.insert(name.clone(), node);
                    Ok(())
                }
            },
            DirRef::Redirect(fs, rest) => {
                drop(guard);
                fs.write_node(&rest, node)
            }
        }
    }

    /// Resolves `path` and returns a deep copy of its node, crossing mounts
    /// if needed.
    pub(crate) fn node_copy(&self, path: &str) -> Result<Node> {
        let segments = path::parse(path)?;
        let guard = self.inner.read().map_err(|_| FsError::Lock)?;

        match guard.resolve(&segments)? {
            Resolution::Found(node) => Ok(node.clone()),
            Resolution::Redirect(fs, rest) => {
                drop(guard);
                fs.node_copy(&rest)
            }
        }
    }

    /// Detaches the file at `path`.
    pub fn remove_file(&self, path: &str) -> Result<()> {
        self.detach(path, KindCheck::File)
    }

    /// Detaches the directory at `path` and everything beneath it.
    pub fn remove_dir(&self, path: &str) -> Result<()> {
        self.detach(path, KindCheck::Directory)
    }

    /// Detaches whatever sits at `path`, skipping the kind check. Used by
    /// unmount, desymlink and snapshot flattening.
    pub(crate) fn remove_any(&self, path: &str) -> Result<()> {
        self.detach(path, KindCheck::Any)
    }

    fn detach(&self, path: &str, kind: KindCheck) -> Result<()> {
        let segments = path::parse(path)?;
        let Some((name, _)) = segments.split_last() else {
            // The root cannot be detached from anything.
            return Err(FsError::InvalidInput);
        };
        let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;

        match guard.dir_of_parent_mut(&segments)? {
            DirRef::Found(children) => {
                let matches = match (&kind, children.get(name)) {
                    (KindCheck::Any, _) => true,
                    (_, None) => false,
                    (KindCheck::File, Some(Node::File(_))) => true,
                    (KindCheck::Directory, Some(Node::Directory(_) | Node::Mount(_))) => true,
                    _ => false,
                };

                if !matches {
                    return Err(FsError::EntryNotFound);
                }

                children.remove(name);
                Ok(())
            }
            DirRef::Redirect(fs, rest) => {
                drop(guard);
                fs.detach(&rest, kind)
            }
        }
    }

    /// Mounts `other` at `path`: writes the structural placeholder, flags
    /// `other` as mounted and records the mount in the side-table. The
    /// mount path must not name an existing entry; that and any placeholder
    /// write failure report `MountFailed`.
    pub fn mount(&self, other: &FileSystem, path: &str) -> Result<()> {
        // A filesystem cannot host itself.
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return Err(FsError::MountFailed);
        }

        let key = path::canonical(path).map_err(|_| FsError::MountFailed)?;
        // The mount point must be free: overwriting an existing entry with
        // the placeholder would destroy it without error.
        if self.exists(&key) {
            return Err(FsError::MountFailed);
        }
        self.write_node(&key, Node::Mount(other.clone()))
            .map_err(|_| FsError::MountFailed)?;

        {
            let mut foreign = other.inner.write().map_err(|_| FsError::Lock)?;
            foreign.mounted = true;
        }

        let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;
        guard.mounts.insert(key.clone(), other.clone());
        debug!(path = %key, "mounted a foreign filesystem");

        Ok(())
    }

    /// Unmounts the filesystem at `path`, which must be a recorded mount
    /// point.
    pub fn unmount(&self, path: &str) -> Result<()> {
        let key = path::canonical(path)?;
        let foreign = {
            let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;
            guard.mounts.remove(&key).ok_or(FsError::NotAMountPoint)?
        };

        {
            let mut foreign = foreign.inner.write().map_err(|_| FsError::Lock)?;
            foreign.mounted = false;
        }

        self.remove_any(&key)?;
        debug!(path = %key, "unmounted");

        Ok(())
    }

    /// Whether this filesystem is currently mounted inside another one.
    pub fn is_mounted(&self) -> bool {
        self.inner.read().map(|guard| guard.mounted).unwrap_or(false)
    }

    /// Creates a symbolic link: copies the node resolved at `source`
    /// verbatim to `target` and records the link in the side-table.
    ///
    /// The link is a write-time snapshot: later changes to `source` do not
    /// show through `target`. The side-table record is what survives an
    /// export/import round trip.
    pub fn symlink(&self, source: &str, target: &str) -> Result<()> {
        let source_key = path::canonical(source).map_err(|_| FsError::SymlinkFailed)?;
        let target_key = path::canonical(target).map_err(|_| FsError::SymlinkFailed)?;

        let copy = self.node_copy(&source_key).map_err(|_| FsError::SymlinkFailed)?;
        self.write_node(&target_key, copy)
            .map_err(|_| FsError::SymlinkFailed)?;

        let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;
        guard.symlinks.insert(target_key.clone(), source_key.clone());
        debug!(source = %source_key, target = %target_key, "symlinked");

        Ok(())
    }

    /// Removes the symbolic link at `target`, which must be a recorded
    /// symlink, along with its copied node.
    pub fn desymlink(&self, target: &str) -> Result<()> {
        let key = path::canonical(target)?;

        {
            let mut guard = self.inner.write().map_err(|_| FsError::Lock)?;
            guard.symlinks.remove(&key).ok_or(FsError::NotASymlink)?;
        }

        self.remove_any(&key)
    }
}

impl fmt::Debug for FileSystem {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn debug(
            children: &BTreeMap<String, Node>,
            formatter: &mut fmt::Formatter<'_>,
            indentation: usize,
        ) -> fmt::Result {
            for (name, node) in children {
                match node {
                    Node::Directory(children) => {
                        writeln!(formatter, "{empty:indentation$}{name}/", empty = "")?;
                        debug(children, formatter, indentation + 2)?;
                    }
                    Node::File(data) => writeln!(
                        formatter,
                        "{empty:indentation$}{name} ({len} bytes)",
                        empty = "",
                        len = data.len(),
                    )?,
                    Node::Mount(_) => {
                        writeln!(formatter, "{empty:indentation$}{name} (mount point)", empty = "")?
                    }
                }
            }

            Ok(())
        }

        let Ok(guard) = self.inner.read() else {
            return writeln!(formatter, "FileSystem (poisoned)");
        };

        writeln!(formatter, "/")?;
        match &guard.root {
            Node::Directory(children) => debug(children, formatter, 2),
            _ => Ok(()),
        }
    }
}
