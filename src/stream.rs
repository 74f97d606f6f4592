//! Streaming read/write adapters over the synchronous operations.
//!
//! These are a thin façade: a read stream snapshots the full file content
//! at creation time, a write stream buffers everything in memory and
//! performs a single atomic write when finalized. There is no partial
//! visibility to stream in either direction.

use crate::filesystem::FileSystem;
use crate::Result;
use std::io::{self, Read, Write};

/// An optional byte range applied to a [`ReadStream`], clamped to the file
/// length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// A reader over a snapshot of a file's content, taken when the stream was
/// created. Later writes to the file do not show through.
#[derive(Debug)]
pub struct ReadStream {
    data: Vec<u8>,
    offset: usize,
}

/// A writer that buffers every chunk in memory and commits them with one
/// atomic write in [`WriteStream::finish`]. Dropping the stream without
/// finishing leaves the empty placeholder written at creation, never a
/// partial file.
#[derive(Debug)]
pub struct WriteStream {
    fs: FileSystem,
    path: String,
    buffer: Vec<u8>,
}

impl FileSystem {
    /// Opens a read stream over the file at `path`; fails like
    /// [`FileSystem::read_file`].
    pub fn read_stream(&self, path: &str, range: ReadRange) -> Result<ReadStream> {
        let data = self.read_file(path)?;
        let end = range.end.unwrap_or(data.len()).min(data.len());
        let start = range.start.unwrap_or(0).min(end);

        Ok(ReadStream {
            data: data[start..end].to_vec(),
            offset: 0,
        })
    }

    /// Opens a write stream for the file at `path`. The path is validated
    /// up front by writing an empty file, so a doomed stream fails here
    /// rather than at the end.
    pub fn write_stream(&self, path: &str) -> Result<WriteStream> {
        self.write_file(path, Some(&[] as &[u8]))?;

        Ok(WriteStream {
            fs: self.clone(),
            path: path.to_owned(),
            buffer: Vec::new(),
        })
    }
}

impl Read for ReadStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.offset..];
        let amount = remaining.len().min(buf.len());
        buf[..amount].copy_from_slice(&remaining[..amount]);
        self.offset += amount;

        Ok(amount)
    }
}

impl Write for WriteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Content only reaches the tree in `finish`.
        Ok(())
    }
}

impl WriteStream {
    /// Commits the buffered content with a single atomic write.
    pub fn finish(self) -> Result<()> {
        self.fs.write_file(&self.path, Some(self.buffer))
    }
}

#[cfg(test)]
mod test_stream {
    use super::*;
    use crate::FsError;

    #[test]
    fn test_read_stream_full() {
        let fs = FileSystem::default();
        fs.write_file("/file", Some(b"streamed bytes")).unwrap();

        let mut stream = fs.read_stream("/file", ReadRange::default()).unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"streamed bytes");
    }

    #[test]
    fn test_read_stream_range() {
        let fs = FileSystem::default();
        fs.write_file("/file", Some(b"0123456789")).unwrap();

        let range = ReadRange {
            start: Some(2),
            end: Some(5),
        };
        let mut stream = fs.read_stream("/file", range).unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "234");

        let overshoot = ReadRange {
            start: Some(4),
            end: Some(100),
        };
        let mut stream = fs.read_stream("/file", overshoot).unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "456789", "the range is clamped to the file length");
    }

    #[test]
    fn test_read_stream_snapshots_at_creation() {
        let fs = FileSystem::default();
        fs.write_file("/file", Some(b"before")).unwrap();

        let mut stream = fs.read_stream("/file", ReadRange::default()).unwrap();
        fs.write_file("/file", Some(b"after")).unwrap();

        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"before");
    }

    #[test]
    fn test_read_stream_creation_failures() {
        let fs = FileSystem::default();
        fs.create_dir("/dir").unwrap();

        assert!(matches!(
            fs.read_stream("/missing", ReadRange::default()),
            Err(FsError::EntryNotFound),
        ));
        assert!(matches!(
            fs.read_stream("/dir", ReadRange::default()),
            Err(FsError::IsADirectory),
        ));
    }

    #[test]
    fn test_write_stream_commits_on_finish() {
        let fs = FileSystem::default();

        let mut stream = fs.write_stream("/file").unwrap();
        assert_eq!(
            fs.read_file("/file").unwrap(),
            Vec::<u8>::new(),
            "creation writes the empty placeholder",
        );

        stream.write_all(b"chunk one, ").unwrap();
        stream.write_all(b"chunk two").unwrap();
        assert_eq!(
            fs.read_file("/file").unwrap(),
            Vec::<u8>::new(),
            "chunks stay buffered until finish",
        );

        stream.finish().unwrap();
        assert_eq!(fs.read_file("/file").unwrap(), b"chunk one, chunk two");
    }

    #[test]
    fn test_write_stream_validates_up_front() {
        let fs = FileSystem::default();
        fs.create_dir("/dir").unwrap();

        assert!(matches!(
            fs.write_stream("/missing/file"),
            Err(FsError::EntryNotFound),
        ));
        assert!(matches!(fs.write_stream("/dir"), Err(FsError::IsADirectory)));
    }
}
