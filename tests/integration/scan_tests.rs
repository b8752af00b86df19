use dupsweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupsweep::error::ConfigError;
use dupsweep::scanner::{HashAlgorithm, WalkerConfig};
use dupsweep::signal::CancellationToken;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

fn write(path: PathBuf, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.stats.total_files, 0);
    assert_eq!(result.stats.duplicate_files, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"content a");
    write(dir.path().join("b.txt"), b"content b");
    write(dir.path().join("c.txt"), b"content c");

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.stats.total_files, 3);
}

#[test]
fn test_scan_three_copies_and_a_unique_file() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"hello");
    write(dir.path().join("b.txt"), b"hello");
    fs::create_dir(dir.path().join("sub")).unwrap();
    write(dir.path().join("sub").join("c.txt"), b"hello");
    write(dir.path().join("d.txt"), b"world");

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.size, 5);
    assert_eq!(group.files.len(), 3);
    // md5("hello")
    assert_eq!(group.hash, "5d41402abc4b2a76b9719d911017c592");
    assert!(!group.contains(&dir.path().join("d.txt")));

    assert_eq!(result.stats.total_files, 4);
    assert_eq!(result.stats.duplicate_files, 2);
    assert_eq!(result.stats.duplicate_size, 10);
}

#[test]
fn test_same_size_different_content_not_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.bin"), b"aaaa");
    write(dir.path().join("b.bin"), b"bbbb");

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(result.groups.is_empty());
}

#[test]
fn test_groups_sorted_by_size_descending() {
    let dir = tempdir().unwrap();
    write(dir.path().join("s1"), b"ab");
    write(dir.path().join("s2"), b"ab");
    write(dir.path().join("l1"), b"a much longer body");
    write(dir.path().join("l2"), b"a much longer body");
    write(dir.path().join("m1"), b"middle");
    write(dir.path().join("m2"), b"middle");

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    let sizes: Vec<u64> = result.groups.iter().map(|g| g.size).collect();
    assert_eq!(sizes, vec![18, 6, 2]);
}

#[test]
fn test_empty_files_form_a_group() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1")).unwrap();
    File::create(dir.path().join("empty2")).unwrap();

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].size, 0);
    assert_eq!(result.stats.duplicate_size, 0);
}

#[test]
fn test_extension_filter() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.JPG"), b"pixels");
    write(dir.path().join("b.jpg"), b"pixels");
    write(dir.path().join("c.txt"), b"pixels");

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_extensions(["jpg"]));
    let result = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.stats.total_files, 2);
    assert_eq!(result.groups.len(), 1);
    assert!(!result.groups[0].contains(&dir.path().join("c.txt")));
}

#[test]
fn test_size_bounds_are_inclusive() {
    let dir = tempdir().unwrap();
    write(dir.path().join("small1"), b"12");
    write(dir.path().join("small2"), b"12");
    write(dir.path().join("edge1"), b"1234");
    write(dir.path().join("edge2"), b"1234");
    write(dir.path().join("big1"), b"12345678");
    write(dir.path().join("big2"), b"12345678");

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_size_bounds(4, 4));
    let result = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].size, 4);
    assert_eq!(result.stats.total_files, 2);
}

#[test]
fn test_inverted_size_bounds_rejected() {
    let dir = tempdir().unwrap();
    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_size_bounds(10, 5));
    let err = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap_err();

    assert!(matches!(
        err,
        FinderError::Config(ConfigError::InvalidSizeBounds { min: 10, max: 5 })
    ));
}

#[test]
fn test_default_excluded_directories() {
    let dir = tempdir().unwrap();
    let git = dir.path().join(".git");
    let modules = dir.path().join("app").join("node_modules");
    fs::create_dir_all(&git).unwrap();
    fs::create_dir_all(&modules).unwrap();
    write(git.join("obj"), b"same");
    write(modules.join("lib.js"), b"same");
    write(dir.path().join("keep.txt"), b"same");

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.stats.total_files, 1);
    assert!(result.groups.is_empty());
}

#[test]
fn test_hash_algorithms_agree_on_grouping() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a"), b"payload");
    write(dir.path().join("b"), b"payload");
    write(dir.path().join("c"), b"PAYLOAD");

    for algorithm in HashAlgorithm::ALL {
        let config = FinderConfig::default().with_hash_algorithm(algorithm);
        let result = DuplicateFinder::new(config)
            .scan(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(result.groups.len(), 1, "{algorithm}");
        assert_eq!(result.groups[0].files.len(), 2);
        assert_eq!(result.groups[0].hash.len(), algorithm.hex_len());
    }
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write(dir.path().join(format!("dup_{i}")), b"repeated");
        write(dir.path().join(format!("uniq_{i}")), format!("unique {i}").as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let first = finder.scan(&[dir.path().to_path_buf()]).unwrap();
    let second = finder.scan(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.stats.duplicate_files, 4);
}

#[test]
fn test_missing_root_is_skipped() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a"), b"x");
    write(dir.path().join("b"), b"x");

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().join("missing"), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.roots.len(), 1);
    assert_eq!(result.groups.len(), 1);
}

#[test]
fn test_no_existing_roots_is_config_error() {
    let dir = tempdir().unwrap();
    let err = DuplicateFinder::with_defaults()
        .scan(&[dir.path().join("nope")])
        .unwrap_err();

    assert!(matches!(err, FinderError::Config(ConfigError::NoRoots)));
}

#[test]
fn test_cancelled_scan_returns_interrupted() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a"), b"x");
    write(dir.path().join("b"), b"x");

    let token = CancellationToken::new();
    token.cancel();
    let config = FinderConfig::default().with_cancellation(token);
    let err = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap_err();

    assert!(matches!(err, FinderError::Interrupted));
}

#[test]
fn test_progress_reports_hashing() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a"), b"x");
    write(dir.path().join("b"), b"x");
    write(dir.path().join("c"), b"x");

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let callback = move |current: usize, total: usize, _msg: &str| {
        if total > 0 {
            assert!(current <= total);
            seen.fetch_add(1, Ordering::SeqCst);
        }
    };

    let config = FinderConfig::default().with_progress_callback(Arc::new(callback));
    DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_two_equal_one_larger() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"0123456789");
    write(dir.path().join("b.txt"), b"0123456789");
    write(dir.path().join("c.txt"), b"01234567890123456789");

    let result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].size, 10);
    assert_eq!(result.groups[0].files.len(), 2);
    assert!(!result.groups[0].contains(&dir.path().join("c.txt")));
}

#[test]
fn test_sha256_changes_with_one_byte() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a"), b"identical bytes");
    write(dir.path().join("b"), b"identical bytes");
    write(dir.path().join("c"), b"identical bytez");

    let config = FinderConfig::default().with_hash_algorithm(HashAlgorithm::Sha256);
    let result = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.files.len(), 2);
    assert!(!group.contains(&dir.path().join("c")));
    assert_eq!(group.hash.len(), 64);
}
