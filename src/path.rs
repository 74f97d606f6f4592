//! Path parsing for the two supported grammars.
//!
//! A path is either POSIX-style (leading `/`, `/` separators) or
//! drive-letter-style (`X:` prefix, `/` and `\` both accepted). Parsing
//! produces the ordered list of non-empty segments; the root alone produces
//! an empty list. `std::path::Path` is deliberately not used here: its
//! prefix handling is platform-dependent, while both grammars must behave
//! identically everywhere.

use crate::{FsError, Result};

/// Splits a path into its normalized segments.
///
/// Repeated separators collapse, a trailing separator is ignored, and the
/// drive prefix is upper-cased so that `c:\x` and `C:/x` name the same
/// entry. Anything that matches neither grammar is an [`FsError::InvalidPath`].
pub(crate) fn parse(path: &str) -> Result<Vec<String>> {
    if let Some(rest) = path.strip_prefix('/') {
        Ok(rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect())
    } else if has_drive_prefix(path) {
        let mut segments: Vec<String> = path
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        if let Some(first) = segments.first_mut() {
            *first = first.to_uppercase();
        }
        Ok(segments)
    } else {
        Err(FsError::InvalidPath)
    }
}

/// Renders the canonical form of a path, used as the key of the mount and
/// symlink side-tables (`/a/b`, `C:/x`; the root is `/`).
pub(crate) fn canonical(path: &str) -> Result<String> {
    Ok(render(&parse(path)?))
}

pub(crate) fn render(segments: &[String]) -> String {
    match segments.first() {
        None => "/".to_owned(),
        Some(first) if has_drive_prefix(first) => segments.join("/"),
        Some(_) => format!("/{}", segments.join("/")),
    }
}

/// Renders segments as a POSIX-style absolute path, used when an operation
/// re-enters a mounted filesystem with the unconsumed tail of its path.
pub(crate) fn render_posix(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod test_path {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        parse(path).unwrap()
    }

    #[test]
    fn test_posix_paths() {
        assert_eq!(segments("/"), Vec::<String>::new(), "the root is empty");
        assert_eq!(segments("/a/b"), ["a", "b"]);
        assert_eq!(
            segments("/a//b/"),
            ["a", "b"],
            "repeated and trailing separators collapse",
        );
        assert_eq!(segments("///"), Vec::<String>::new());
    }

    #[test]
    fn test_drive_paths() {
        assert_eq!(segments("C:/x"), ["C:", "x"]);
        assert_eq!(
            segments("c:\\x"),
            ["C:", "x"],
            "backslashes and lowercase drives normalize",
        );
        assert_eq!(segments("C:/x\\y//z"), ["C:", "x", "y", "z"]);
        assert_eq!(segments("C:"), ["C:"], "a bare drive is a single segment");
    }

    #[test]
    fn test_invalid_paths() {
        assert_eq!(parse("a/b"), Err(FsError::InvalidPath), "no anchor");
        assert_eq!(parse(""), Err(FsError::InvalidPath));
        assert_eq!(parse("ab:/x"), Err(FsError::InvalidPath), "not a drive");
        assert_eq!(parse("\\x"), Err(FsError::InvalidPath));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(canonical("/a//b/").unwrap(), "/a/b");
        assert_eq!(canonical("C:\\x").unwrap(), "C:/x");
        assert_eq!(canonical("/").unwrap(), "/");
        assert_eq!(
            canonical("C:/x").unwrap(),
            canonical("c:\\x//").unwrap(),
            "both spellings share one canonical key",
        );
    }

    #[test]
    fn test_render_posix() {
        assert_eq!(render_posix(&["a".to_owned(), "b".to_owned()]), "/a/b");
        assert_eq!(render_posix(&[]), "/");
    }
}
