//! Whole-tree helpers layered on top of the public operations.

use crate::filesystem::FileSystem;
use crate::path;
use crate::Result;
use std::collections::VecDeque;

/// A flattened listing of everything beneath a path, in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crawl {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

/// Recursively enumerates `read_dir` results under `start` into flat lists
/// of all files and folders. Only the listing surface of the filesystem is
/// consumed, so the crawl follows mounts transparently.
pub fn crawl(fs: &FileSystem, start: &str) -> Result<Crawl> {
    let mut crawl = Crawl::default();
    let mut remaining = VecDeque::new();
    remaining.push_back(path::canonical(start)?);

    while let Some(next) = remaining.pop_front() {
        for entry in fs.read_dir(&next)? {
            let full = join(&next, &entry.name);
            if entry.metadata.is_dir() {
                crawl.folders.push(full.clone());
                remaining.push_back(full);
            } else {
                crawl.files.push(full);
            }
        }
    }

    Ok(crawl)
}

fn join(base: &str, name: &str) -> String {
    if base == "/" {
        format!("/{name}")
    } else {
        format!("{base}/{name}")
    }
}
