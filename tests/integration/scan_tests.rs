use broom::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use broom::scanner::{Group, SamplingConfig, ScanError, TrackerConfig};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let report = finder.find_duplicates(dir.path()).unwrap();

    assert!(report.groups.is_empty());
    assert!(report.empty_files.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert_eq!(report.summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_sizes_never_fingerprinted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"a").unwrap();
    fs::write(dir.path().join("b.txt"), b"bb").unwrap();
    fs::write(dir.path().join("c.txt"), b"ccc").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.eliminated_by_size, 3);
    assert_eq!(report.summary.eliminated_by_fingerprint, 0);
}

#[test]
fn test_scan_unique_content_then_pair() {
    // a is unique by content but shares its size with b and c.
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), vec![1u8; 100]).unwrap();
    fs::write(dir.path().join("b"), vec![2u8; 100]).unwrap();
    fs::write(dir.path().join("c"), vec![2u8; 100]).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.summary.eliminated_by_size, 0);
    assert_eq!(report.summary.eliminated_by_fingerprint, 1);
    assert_eq!(report.groups.len(), 1);

    let group = &report.groups[0];
    assert!(group.entries[0].path.ends_with("b"));
    assert!(group.entries[1].path.ends_with("c"));
    assert!(group.entries.iter().all(|e| e.group() == Group::Duplicate));
    assert_eq!(report.summary.reclaimable_space, 100);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"hello").unwrap();
    fs::write(dir.path().join("y"), b"world").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.duplicate_groups, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two");
    fs::create_dir_all(&deep).unwrap();
    fs::write(dir.path().join("top.txt"), b"same content").unwrap();
    fs::write(deep.join("bottom.txt"), b"same content").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
}

#[test]
fn test_scan_multiple_groups_in_traversal_order() {
    let dir = tempdir().unwrap();
    for (name, content) in [
        ("1.txt", "group one!"),
        ("2.txt", "group two"),
        ("3.txt", "group one!"),
        ("4.txt", "group two"),
        ("5.txt", "group two"),
    ] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.groups.len(), 2);
    assert!(report.groups[0].entries[0].path.ends_with("1.txt"));
    assert_eq!(report.groups[0].len(), 2);
    assert!(report.groups[1].entries[0].path.ends_with("2.txt"));
    assert_eq!(report.groups[1].len(), 3);
    assert_eq!(report.summary.duplicate_files, 3);
    assert_eq!(report.summary.reclaimable_space, 10 + 9 * 2);
}

#[test]
fn test_scan_sampling_misses_middle_difference() {
    // Identical except for one byte outside every sampled piece.
    let dir = tempdir().unwrap();
    let mut first = vec![0u8; 1000];
    let second = first.clone();
    first[200] = 1;
    fs::write(dir.path().join("first"), &first).unwrap();
    fs::write(dir.path().join("second"), &second).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(report.groups.len(), 1);

    // Reading whole files catches it.
    let thorough = DuplicateFinder::new(
        FinderConfig::default().with_sampling(SamplingConfig::new(1000, 1)),
    );
    let report = thorough.find_duplicates(dir.path()).unwrap();
    assert!(report.groups.is_empty());
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("visible"), b"twin").unwrap();
    fs::write(dir.path().join(".hidden"), b"twin").unwrap();

    let all = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(all.groups.len(), 1);

    let finder = DuplicateFinder::new(
        FinderConfig::default().with_tracker_config(TrackerConfig::default().with_skip_hidden(true)),
    );
    let visible = finder.find_duplicates(dir.path()).unwrap();
    assert!(visible.groups.is_empty());
    assert_eq!(visible.summary.total_files, 1);
}

#[test]
fn test_scan_missing_root() {
    let result = DuplicateFinder::with_defaults()
        .find_duplicates(std::path::Path::new("/non/existent/path/12345"));

    match result {
        Err(FinderError::Scan(ScanError::InvalidArgument(path))) => {
            assert!(path.to_string_lossy().contains("non/existent/path/12345"));
        }
        other => panic!("Expected InvalidArgument, got {:?}", other.map(|r| r.summary)),
    }
}
