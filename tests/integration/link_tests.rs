use dupsweep::actions::{DeleteConfig, Deleter};
use dupsweep::duplicates::{DuplicateFinder, FinderConfig, RetentionStrategy};
use dupsweep::scanner::hardlink::HardlinkTracker;
use dupsweep::scanner::WalkerConfig;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_hardlinks_are_not_duplicates() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let hardlink = dir.path().join("hardlink.txt");
    fs::write(&original, b"identical content").unwrap();

    if let Err(e) = fs::hard_link(&original, &hardlink) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    if HardlinkTracker::is_supported() {
        assert!(result.groups.is_empty());
        assert_eq!(result.stats.total_files, 1);
        assert_eq!(result.stats.hardlinks_skipped, 1);
    } else {
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.stats.total_files, 2);
    }
}

#[test]
fn test_hardlink_plus_real_copy_still_groups() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a.txt");
    let copy = dir.path().join("b.txt");
    let link = dir.path().join("c.txt");
    fs::write(&original, b"payload").unwrap();
    fs::write(&copy, b"payload").unwrap();
    if fs::hard_link(&original, &link).is_err() {
        return;
    }

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    if HardlinkTracker::is_supported() {
        assert_eq!(result.groups[0].files.len(), 2);
    }
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    fs::write(&original, b"content").unwrap();
    std::os::unix::fs::symlink(&original, dir.path().join("symlink.txt")).unwrap();

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.stats.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_followed_symlinked_directory_is_scanned() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    fs::write(dir.path().join("inside.txt"), b"shared").unwrap();
    fs::write(outside.path().join("elsewhere.txt"), b"shared").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    let default_scan = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();
    assert!(default_scan.groups.is_empty());

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_follow_symlinks(true));
    let followed = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();
    assert_eq!(followed.groups.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_symlink_loop_is_reported_not_fatal() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("a"), b"x").unwrap();
    fs::write(sub.join("b"), b"x").unwrap();
    std::os::unix::fs::symlink(dir.path(), sub.join("loop")).unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_follow_symlinks(true));
    let result = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].files.len(), 2);
    assert!(result.stats.errors >= 1);
}

#[cfg(unix)]
#[test]
fn test_following_symlinks_never_deletes_link_target() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    let real = dir.path().join("z_real.txt");
    let link = dir.path().join("a_link.txt");
    fs::write(&real, b"only copy").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_follow_symlinks(true));
    let mut result = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();
    assert!(result.groups.is_empty());
    assert_eq!(result.stats.total_files, 1);

    let delete = DeleteConfig::new(result.roots.clone())
        .with_strategy(RetentionStrategy::Oldest)
        .with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(delete)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(outcome.report.deleted_files.is_empty());
    assert_eq!(fs::read(&real).unwrap(), b"only copy");
    assert_eq!(fs::read(&link).unwrap(), b"only copy");
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_inside_root_not_counted_twice() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("file.txt"), b"reachable twice").unwrap();
    std::os::unix::fs::symlink(&data, dir.path().join("alias")).unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_follow_symlinks(true));
    let result = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.stats.total_files, 1);
    assert_eq!(result.stats.hardlinks_skipped, 1);
}

#[test]
fn test_hardlink_across_two_roots_is_not_a_duplicate() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let original = first.path().join("f.bin");
    fs::write(&original, b"linked bytes").unwrap();
    if fs::hard_link(&original, second.path().join("f.bin")).is_err() {
        return;
    }

    let result = DuplicateFinder::with_defaults()
        .scan(&[first.path().to_path_buf(), second.path().to_path_buf()])
        .unwrap();

    if HardlinkTracker::is_supported() {
        assert!(result.groups.is_empty());
        assert_eq!(result.stats.hardlinks_skipped, 1);
    }
}
