use memfs::{FileSystem, FsError, ops};
use pretty_assertions::assert_eq;

fn build_tree() -> FileSystem {
    let fs = FileSystem::default();
    fs.create_dir_all("/home/user/projects").unwrap();
    fs.create_dir("/etc").unwrap();
    fs.write_file("/etc/hostname", Some(b"memfs")).unwrap();
    fs.write_file("/home/user/projects/notes.txt", Some(b"remember"))
        .unwrap();
    fs.write_file("/home/user/.empty", Some(&[] as &[u8]))
        .unwrap();
    fs.symlink("/etc/hostname", "/home/user/hostname").unwrap();
    fs
}

#[test]
fn round_trip_preserves_structure_contents_and_symlinks() {
    let fs = build_tree();
    let snapshot = fs.export().unwrap();

    let restored = FileSystem::default();
    restored.import(&snapshot).unwrap();

    assert_eq!(
        ops::crawl(&restored, "/").unwrap(),
        ops::crawl(&fs, "/").unwrap(),
        "both trees flatten identically",
    );
    assert_eq!(restored.read_file("/etc/hostname").unwrap(), b"memfs");
    assert_eq!(
        restored
            .read_file("/home/user/projects/notes.txt")
            .unwrap(),
        b"remember",
    );
    assert_eq!(
        restored.read_file("/home/user/.empty").unwrap(),
        Vec::<u8>::new(),
        "zero-length files survive byte-exactly",
    );
    assert_eq!(
        restored.read_file("/home/user/hostname").unwrap(),
        b"memfs",
        "the symlink comes back as a live copy",
    );

    // Still a real symlink: it can be detached as one.
    restored.desymlink("/home/user/hostname").unwrap();
    assert!(!restored.exists("/home/user/hostname"));
}

#[test]
fn snapshots_travel_as_opaque_strings() {
    let fs = build_tree();
    let snapshot = fs.export().unwrap();

    assert!(
        snapshot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='),
        "the encoded snapshot is plain base64 text",
    );

    // A consumer can persist and replay it without understanding it.
    let replayed: String = snapshot.clone();
    let restored = FileSystem::default();
    restored.import(&replayed).unwrap();
    assert!(restored.exists("/etc/hostname"));
}

#[test]
fn mounts_do_not_survive_the_round_trip() {
    let fs = build_tree();
    let guest = FileSystem::default();
    guest.write_file("/volatile", Some(b"gone")).unwrap();
    fs.mount(&guest, "/media").unwrap();

    let snapshot = fs.export().unwrap();
    let restored = FileSystem::default();
    restored.import(&snapshot).unwrap();

    assert!(!restored.exists("/media"));
    assert_eq!(
        restored.mount(&guest, "/media"),
        Ok(()),
        "the caller re-mounts after import",
    );
    assert_eq!(restored.read_file("/media/volatile").unwrap(), b"gone");
}

#[test]
fn import_failure_leaves_the_previous_tree_intact() {
    let fs = build_tree();

    assert_eq!(fs.import("@@@"), Err(FsError::InvalidSnapshot));
    assert_eq!(
        fs.read_file("/etc/hostname").unwrap(),
        b"memfs",
        "nothing was replaced",
    );
}
