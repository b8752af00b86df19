use dupsweep::actions::{DeleteConfig, Deleter};
use dupsweep::duplicates::{DuplicateFinder, RetentionStrategy};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

/// Scan `root` and delete duplicates with `strategy`, returning the surviving paths.
fn clean(root: &Path, reports: &TempDir, strategy: RetentionStrategy) -> Vec<PathBuf> {
    let mut result = DuplicateFinder::with_defaults()
        .scan(&[root.to_path_buf()])
        .unwrap();
    let config = DeleteConfig::new(result.roots.clone())
        .with_strategy(strategy)
        .with_report_dir(reports.path().to_path_buf());

    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();
    assert_eq!(outcome.report.stats.errors, 0);

    let mut survivors: Vec<PathBuf> = result
        .groups
        .iter()
        .flat_map(|g| g.files.iter().map(|f| f.path.clone()))
        .collect();
    survivors.sort();
    survivors
}

#[test]
fn test_oldest_keeps_first_created() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    let first = dir.path().join("zz_first.txt");
    let second = dir.path().join("aa_second.txt");

    fs::write(&first, b"same bytes").unwrap();
    thread::sleep(Duration::from_millis(50));
    fs::write(&second, b"same bytes").unwrap();

    let survivors = clean(dir.path(), &reports, RetentionStrategy::Oldest);

    assert_eq!(survivors, vec![first.clone()]);
    assert!(first.exists());
    assert!(!second.exists());
}

#[test]
fn test_oldest_of_three_deletes_the_other_two() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    let names = ["c_t1.txt", "a_t2.txt", "b_t3.txt"];
    for name in names {
        fs::write(dir.path().join(name), b"triplicate").unwrap();
        thread::sleep(Duration::from_millis(50));
    }

    let mut result = DuplicateFinder::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();
    let config = DeleteConfig::new(result.roots.clone())
        .with_strategy(RetentionStrategy::Oldest)
        .with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(dir.path().join("c_t1.txt").exists());
    let mut deleted: Vec<PathBuf> = outcome
        .report
        .deleted_files
        .iter()
        .map(|f| f.original_path.clone())
        .collect();
    deleted.sort();
    assert_eq!(
        deleted,
        vec![dir.path().join("a_t2.txt"), dir.path().join("b_t3.txt")]
    );
    assert_eq!(outcome.report.stats.deleted_files, 2);
}

#[test]
fn test_newest_keeps_latest_modified() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");
    for path in [&a, &b, &c] {
        fs::write(path, b"content").unwrap();
    }
    set_file_mtime(&a, FileTime::from_unix_time(1_000_000, 0)).unwrap();
    set_file_mtime(&b, FileTime::from_unix_time(3_000_000, 0)).unwrap();
    set_file_mtime(&c, FileTime::from_unix_time(2_000_000, 0)).unwrap();

    let survivors = clean(dir.path(), &reports, RetentionStrategy::Newest);

    assert_eq!(survivors, vec![b.clone()]);
    assert!(!a.exists());
    assert!(!c.exists());
}

#[test]
fn test_shortest_path_keeps_shallow_copy() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    let deep = dir.path().join("nested").join("deeper");
    fs::create_dir_all(&deep).unwrap();
    let short = dir.path().join("x");
    let long = deep.join("copy_of_x");
    fs::write(&short, b"data").unwrap();
    fs::write(&long, b"data").unwrap();

    let survivors = clean(dir.path(), &reports, RetentionStrategy::ShortestPath);

    assert_eq!(survivors, vec![short]);
    assert!(!long.exists());
}

#[test]
fn test_longest_path_keeps_deep_copy() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    let deep = dir.path().join("archive");
    fs::create_dir_all(&deep).unwrap();
    let short = dir.path().join("x");
    let long = deep.join("x_original");
    fs::write(&short, b"data").unwrap();
    fs::write(&long, b"data").unwrap();

    let survivors = clean(dir.path(), &reports, RetentionStrategy::LongestPath);

    assert_eq!(survivors, vec![long]);
    assert!(!short.exists());
}

#[test]
fn test_equal_keys_keep_enumeration_order() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    let a = dir.path().join("a1");
    let b = dir.path().join("b1");
    fs::write(&a, b"tie").unwrap();
    fs::write(&b, b"tie").unwrap();

    // Same path length: the first enumerated file wins.
    let survivors = clean(dir.path(), &reports, RetentionStrategy::ShortestPath);

    assert_eq!(survivors, vec![a]);
    assert!(!b.exists());
}

#[test]
fn test_exactly_one_survivor_per_group() {
    let dir = tempdir().unwrap();
    let reports = tempdir().unwrap();
    for i in 0..4 {
        fs::write(dir.path().join(format!("alpha_{i}")), b"alpha").unwrap();
        fs::write(dir.path().join(format!("beta_{i}")), b"beta!!").unwrap();
    }
    fs::write(dir.path().join("unique"), b"only me").unwrap();

    for strategy in RetentionStrategy::ALL {
        let survivors = clean(dir.path(), &reports, strategy);
        assert!(survivors.len() <= 2, "{strategy}");
    }

    let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(remaining.len(), 3);
}
