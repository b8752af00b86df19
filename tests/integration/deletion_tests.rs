use dupsweep::actions::{DeleteConfig, Deleter};
use dupsweep::duplicates::{DuplicateFinder, RetentionStrategy, ScanResult};
use dupsweep::report::DeletionReport;
use dupsweep::signal::CancellationToken;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn scan(root: &Path) -> ScanResult {
    DuplicateFinder::with_defaults()
        .scan(&[root.to_path_buf()])
        .unwrap()
}

fn populate(root: &Path) {
    fs::create_dir_all(root.join("photos").join("2020")).unwrap();
    fs::write(root.join("a.jpg"), b"jpeg bytes").unwrap();
    fs::write(root.join("photos").join("a_copy.jpg"), b"jpeg bytes").unwrap();
    fs::write(root.join("photos").join("2020").join("a.jpg"), b"jpeg bytes").unwrap();
    fs::write(root.join("notes.txt"), b"unique").unwrap();
}

#[test]
fn test_clean_with_backup_mirrors_layout() {
    let root = tempdir().unwrap();
    let backup = tempdir().unwrap();
    let reports = tempdir().unwrap();
    populate(root.path());

    let mut result = scan(root.path());
    let config = DeleteConfig::new(result.roots.clone())
        .with_strategy(RetentionStrategy::ShortestPath)
        .with_backup_dir(backup.path().to_path_buf())
        .with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(root.path().join("a.jpg").exists());
    assert!(!root.path().join("photos").join("a_copy.jpg").exists());
    assert!(!root.path().join("photos").join("2020").join("a.jpg").exists());
    assert!(root.path().join("notes.txt").exists());

    let mirrored = backup.path().join("photos").join("2020").join("a.jpg");
    assert_eq!(fs::read(&mirrored).unwrap(), b"jpeg bytes");
    assert!(backup.path().join("photos").join("a_copy.jpg").exists());

    let stats = &outcome.report.stats;
    assert_eq!(stats.deleted_files, 2);
    assert_eq!(stats.backed_up_files, 2);
    assert_eq!(stats.errors, 0);
    assert_eq!(outcome.report.deleted_files.len(), stats.deleted_files);
    assert!(outcome
        .report
        .deleted_files
        .iter()
        .all(|f| f.backup_path.as_ref().is_some_and(|p| p.exists())));
}

#[test]
fn test_report_written_and_loadable() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    populate(root.path());

    let mut result = scan(root.path());
    let config =
        DeleteConfig::new(result.roots.clone()).with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(outcome.report_path.starts_with(reports.path()));
    let name = outcome
        .report_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(name.starts_with("deletion_report_"));
    assert!(name.ends_with(".json"));

    let loaded = DeletionReport::load(&outcome.report_path).unwrap();
    assert_eq!(loaded.deleted_files, outcome.report.deleted_files);
    assert_eq!(loaded.settings, outcome.report.settings);
    assert_eq!(loaded.stats.deleted_files, outcome.report.stats.deleted_files);
    assert_eq!(loaded.stats.total_files, 4);
    assert_eq!(loaded.settings.backup_dir, None);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outcome.report_path).unwrap()).unwrap();
    assert!(raw["settings"]["rootPaths"].is_array());
    assert!(raw["deletedFiles"][0]["originalPath"].is_string());
}

#[test]
fn test_second_run_does_not_overwrite_report() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    fs::write(root.path().join("a"), b"one").unwrap();
    fs::write(root.path().join("b"), b"one").unwrap();

    let mut paths = Vec::new();
    for _ in 0..2 {
        let mut result = scan(root.path());
        let config =
            DeleteConfig::new(result.roots.clone()).with_report_dir(reports.path().to_path_buf());
        let outcome = Deleter::new(config)
            .delete_duplicates(&mut result.groups, result.stats)
            .unwrap();
        paths.push(outcome.report_path);
    }

    assert_ne!(paths[0], paths[1]);
    assert!(paths.iter().all(|p| p.exists()));
    assert_eq!(fs::read_dir(reports.path()).unwrap().count(), 2);
}

#[test]
fn test_failed_backup_keeps_original() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    fs::write(root.path().join("a"), b"data").unwrap();
    fs::write(root.path().join("b"), b"data").unwrap();

    // A regular file cannot serve as a directory, so every backup fails.
    let blocker = reports.path().join("not_a_dir");
    fs::write(&blocker, b"").unwrap();

    let mut result = scan(root.path());
    let config = DeleteConfig::new(result.roots.clone())
        .with_backup_dir(blocker.join("backups"))
        .with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(root.path().join("a").exists());
    assert!(root.path().join("b").exists());
    assert_eq!(outcome.report.stats.deleted_files, 0);
    assert_eq!(outcome.report.stats.backed_up_files, 0);
    assert_eq!(outcome.report.stats.errors, 1);
    assert!(outcome.report.deleted_files.is_empty());
    assert_eq!(result.groups[0].files.len(), 2);
}

#[test]
fn test_modified_after_scan_is_skipped() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    fs::write(root.path().join("a"), b"data").unwrap();
    fs::write(root.path().join("b"), b"data").unwrap();

    let mut result = scan(root.path());
    fs::write(root.path().join("b"), b"data grew").unwrap();

    let config =
        DeleteConfig::new(result.roots.clone()).with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(root.path().join("b").exists());
    assert_eq!(outcome.report.stats.errors, 1);
    assert_eq!(outcome.report.stats.deleted_files, 0);
}

#[test]
fn test_vanished_candidate_counts_error_and_continues() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(root.path().join(name), b"triplet").unwrap();
    }

    let mut result = scan(root.path());
    fs::remove_file(root.path().join("b")).unwrap();

    let config =
        DeleteConfig::new(result.roots.clone()).with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert_eq!(outcome.report.stats.errors, 1);
    assert_eq!(outcome.report.stats.deleted_files, 1);
    assert!(root.path().join("a").exists() || root.path().join("c").exists());
}

#[test]
fn test_vanished_keeper_leaves_copy_on_disk() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    fs::write(root.path().join("a"), b"pair").unwrap();
    fs::write(root.path().join("b"), b"pair").unwrap();

    let mut result = scan(root.path());
    fs::remove_file(root.path().join("a")).unwrap();

    let config = DeleteConfig::new(result.roots.clone())
        .with_strategy(RetentionStrategy::ShortestPath)
        .with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(root.path().join("b").exists());
    assert!(outcome.report.deleted_files.is_empty());
    assert_eq!(outcome.report.stats.errors, 1);
}

#[test]
fn test_paranoid_mode_deletes_identical_files() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    fs::write(root.path().join("a"), b"verified").unwrap();
    fs::write(root.path().join("b"), b"verified").unwrap();

    let mut result = scan(root.path());
    let config = DeleteConfig::new(result.roots.clone())
        .with_paranoid(true)
        .with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert_eq!(outcome.report.stats.deleted_files, 1);
    assert!(outcome.report.settings.paranoid);
}

#[test]
fn test_cancelled_before_start_writes_interrupted_report() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    fs::write(root.path().join("a"), b"data").unwrap();
    fs::write(root.path().join("b"), b"data").unwrap();

    let mut result = scan(root.path());
    let token = CancellationToken::new();
    token.cancel();

    let config =
        DeleteConfig::new(result.roots.clone()).with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .with_cancellation(token)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(outcome.report.interrupted);
    assert_eq!(outcome.report.stats.deleted_files, 0);
    assert!(outcome.report_path.exists());
    assert!(root.path().join("b").exists());
}

#[test]
fn test_cancel_from_progress_callback_stops_midway() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    for i in 0..6 {
        fs::write(root.path().join(format!("f{i}")), b"many copies").unwrap();
    }

    let mut result = scan(root.path());
    let token = CancellationToken::new();
    let trigger = token.clone();
    let callback = move |current: usize, _total: usize, _msg: &str| {
        if current >= 2 {
            trigger.cancel();
        }
    };

    let config =
        DeleteConfig::new(result.roots.clone()).with_report_dir(reports.path().to_path_buf());
    let outcome = Deleter::new(config)
        .with_cancellation(token)
        .with_progress_callback(Arc::new(callback))
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    assert!(outcome.report.interrupted);
    assert_eq!(outcome.report.stats.deleted_files, 2);
    assert_eq!(outcome.report.deleted_files.len(), 2);
    assert_eq!(result.groups[0].files.len(), 4);
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 4);
}

#[test]
fn test_clean_then_rescan_finds_nothing() {
    let root = tempdir().unwrap();
    let reports = tempdir().unwrap();
    populate(root.path());

    let mut result = scan(root.path());
    let config =
        DeleteConfig::new(result.roots.clone()).with_report_dir(reports.path().to_path_buf());
    Deleter::new(config)
        .delete_duplicates(&mut result.groups, result.stats)
        .unwrap();

    let rescan = scan(root.path());
    assert!(rescan.groups.is_empty());
    assert_eq!(rescan.stats.total_files, 2);
}
