use broom::duplicates::DuplicateFinder;
use broom::error::ExitCode;
use broom::output::{save_results, JsonOutput, Layout, ResultsFile, RESULTS_FILE_NAME};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_results_file_grouped() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("empty"), b"").unwrap();
    fs::write(dir.path().join("b"), b"twin").unwrap();
    fs::write(dir.path().join("c"), b"twin").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let path = save_results(
        out.path(),
        &ResultsFile::new(&report.empty_files, &report.groups, Layout::Grouped),
    )
    .unwrap();

    let root = dir.path().canonicalize().unwrap();
    let expected = format!(
        "[EMPTY FILES]\n{}\n\n[DUPLICATE GROUP]\n{}\n{}\n\n",
        root.join("empty").display(),
        root.join("b").display(),
        root.join("c").display()
    );
    assert_eq!(path, out.path().join(RESULTS_FILE_NAME));
    assert_eq!(fs::read_to_string(path).unwrap(), expected);
}

#[test]
fn test_results_file_flat() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty"), b"").unwrap();
    fs::write(dir.path().join("b"), b"twin").unwrap();
    fs::write(dir.path().join("c"), b"twin").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let text = ResultsFile::new(&report.empty_files, &report.groups, Layout::Flat).render();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("empty --- is an empty file"));
    assert!(lines[1].ends_with("b --- is a duplicate of another file"));
    assert!(lines[2].ends_with("c --- is a duplicate of another file"));
    assert!(lines.iter().all(|l| l.starts_with('/') || cfg!(windows)));
}

#[test]
fn test_json_report_from_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b"), b"twin").unwrap();
    fs::write(dir.path().join("c"), b"twin").unwrap();
    fs::write(dir.path().join("d"), b"solo!").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let json = JsonOutput::new(&report, ExitCode::Success)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["duplicates"].as_array().unwrap().len(), 1);
    assert_eq!(value["duplicates"][0]["fingerprint"], hex_of(b"twin"));
    assert_eq!(value["summary"]["total_files"], 3);
    assert_eq!(value["summary"]["eliminated_by_size"], 1);
    assert!(value.get("sweep").is_none());
}

fn hex_of(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
