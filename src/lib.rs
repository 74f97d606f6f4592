//! An in-memory virtual filesystem.
//!
//! The whole tree of directories and files lives in memory; nothing ever
//! touches a real disk. Paths use either the POSIX grammar (`/a/b`) or the
//! drive-letter grammar (`C:\x`, `C:/x`). On top of the synchronous
//! create/read/update/delete core, the crate offers sub-filesystem mounting,
//! write-time-copy symbolic links, serialization of the whole tree to a
//! single portable string, deferred (future-based) variants of every
//! operation, and streaming read/write adapters.
//!
//! ```
//! use memfs::FileSystem;
//!
//! let fs = FileSystem::default();
//! fs.create_dir_all("/etc/app").unwrap();
//! fs.write_file("/etc/app/config", Some(b"answer = 42")).unwrap();
//! assert_eq!(
//!     fs.read_file_to_string("/etc/app/config").unwrap(),
//!     "answer = 42",
//! );
//! ```

mod deferred;
mod filesystem;
mod node;
pub mod ops;
mod path;
mod perm;
mod snapshot;
mod stream;

pub use filesystem::FileSystem;
pub use perm::{GroupId, PermissionRegistry, UserRecord};
pub use stream::{ReadRange, ReadStream, WriteStream};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FsError>;

/// Error type for all filesystem operations.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum FsError {
    /// The path matches neither the POSIX nor the drive-letter grammar
    #[error("invalid path")]
    InvalidPath,
    /// The requested file or directory could not be found
    #[error("entry not found")]
    EntryNotFound,
    /// An entry with this name already exists
    #[error("entry already exists")]
    AlreadyExists,
    /// Expected a directory but found something else
    #[error("not a directory")]
    NotADirectory,
    /// Expected a file but found a directory
    #[error("is a directory")]
    IsADirectory,
    /// A write was submitted without content
    #[error("missing content")]
    MissingContent,
    /// No mount is recorded at this path
    #[error("not a mount point")]
    NotAMountPoint,
    /// No symlink is recorded at this path
    #[error("not a symlink")]
    NotASymlink,
    /// The mount placeholder could not be written
    #[error("mount failed")]
    MountFailed,
    /// The symlink source could not be resolved, or its copy not written
    #[error("symlink failed")]
    SymlinkFailed,
    /// The snapshot is not a well-formed encoded tree
    #[error("invalid snapshot")]
    InvalidSnapshot,
    /// Invalid internal data, e.g. non-UTF-8 bytes read as a string
    #[error("invalid internal data")]
    InvalidData,
    /// The provided input is invalid, e.g. detaching the root directory
    #[error("invalid input")]
    InvalidInput,
    /// A lock was poisoned
    #[error("lock poisoned")]
    Lock,
}

/// The kind of an entry, as reported by [`FileSystem::metadata`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileType {
    pub dir: bool,
    pub file: bool,
}

impl FileType {
    pub fn is_dir(&self) -> bool {
        self.dir
    }

    pub fn is_file(&self) -> bool {
        self.file
    }
}

/// Metadata of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metadata {
    pub ft: FileType,
    pub len: u64,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.ft.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.ft.is_file()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One entry yielded by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub metadata: Metadata,
}

/// The result of [`FileSystem::read_dir`], iterable as [`DirEntry`] items
/// sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadDir {
    data: Vec<DirEntry>,
    index: usize,
}

impl ReadDir {
    pub(crate) fn new(data: Vec<DirEntry>) -> Self {
        Self { data, index: 0 }
    }

    /// The names of the immediate children, sorted.
    pub fn names(&self) -> Vec<String> {
        self.data.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl Iterator for ReadDir {
    type Item = DirEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.data.get(self.index).cloned();
        if entry.is_some() {
            self.index += 1;
        }
        entry
    }
}
