use memfs::{FileSystem, FsError, ops};
use pretty_assertions::assert_eq;

#[test]
fn reads_and_writes_resolve_into_the_mounted_tree() {
    let host = FileSystem::default();
    let guest = FileSystem::default();

    guest.create_dir_all("/srv/www").unwrap();
    guest
        .write_file("/srv/www/index.html", Some(b"<html/>"))
        .unwrap();

    host.create_dir("/mnt").unwrap();
    host.mount(&guest, "/mnt/web").unwrap();

    assert_eq!(
        host.read_file("/mnt/web/srv/www/index.html").unwrap(),
        b"<html/>",
    );
    assert_eq!(host.read_dir("/mnt/web").unwrap().names(), vec!["srv"]);

    host.write_file("/mnt/web/srv/www/404.html", Some(b"lost"))
        .unwrap();
    assert_eq!(
        guest.read_file("/srv/www/404.html").unwrap(),
        b"lost",
        "the foreign filesystem owns the data written through the mount",
    );

    host.remove_file("/mnt/web/srv/www/404.html").unwrap();
    assert!(!guest.exists("/srv/www/404.html"));
}

#[test]
fn unmount_detaches_the_placeholder() {
    let host = FileSystem::default();
    let guest = FileSystem::default();
    guest.write_file("/inside", Some(b"x")).unwrap();

    host.mount(&guest, "/m").unwrap();
    assert!(guest.is_mounted());
    assert!(host.exists("/m/inside"));

    host.unmount("/m").unwrap();
    assert!(!guest.is_mounted());
    assert!(!host.exists("/m"));
    assert_eq!(host.read_file("/m/inside"), Err(FsError::EntryNotFound));
    assert!(
        guest.exists("/inside"),
        "unmounting never touches the foreign tree",
    );
}

#[test]
fn mount_paths_share_one_canonical_key() {
    let host = FileSystem::default();
    let guest = FileSystem::default();

    host.create_dir("C:").unwrap();
    host.mount(&guest, "C:/mnt").unwrap();
    assert_eq!(
        host.unmount("c:\\mnt"),
        Ok(()),
        "both drive spellings name the same mount point",
    );
}

#[test]
fn nested_mounts_chain_resolution() {
    let outer = FileSystem::default();
    let middle = FileSystem::default();
    let inner = FileSystem::default();

    inner.write_file("/leaf", Some(b"deep")).unwrap();
    middle.mount(&inner, "/inner").unwrap();
    outer.mount(&middle, "/middle").unwrap();

    assert_eq!(outer.read_file("/middle/inner/leaf").unwrap(), b"deep");

    let crawl = ops::crawl(&outer, "/").unwrap();
    assert_eq!(crawl.folders, vec!["/middle", "/middle/inner"]);
    assert_eq!(crawl.files, vec!["/middle/inner/leaf"]);
}
