use broom::actions::{estimated_bytes_freed, remove_duplicates_make_symlinks, remove_empty_files};
use broom::cli::Cli;
use broom::duplicates::DuplicateFinder;
use broom::error::ExitCode;
use broom::output::RESULTS_FILE_NAME;
use clap::Parser;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn run_with_config(args: &[&str], output: &TempDir, config: &str) -> anyhow::Result<ExitCode> {
    let config_path = output.path().join("config.toml");
    fs::write(&config_path, config).unwrap();
    let mut argv = vec!["broom", "-q"];
    argv.extend_from_slice(args);
    argv.extend_from_slice(&[
        "-o",
        output.path().to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
    ]);
    broom::run_app(Cli::try_parse_from(argv).unwrap())
}

fn run(args: &[&str], output: &TempDir) -> anyhow::Result<ExitCode> {
    run_with_config(args, output, "")
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(unix)]
#[test]
fn test_sweep_replaces_duplicate_with_symlink() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("a"), vec![1u8; 100]).unwrap();
    fs::write(dir.path().join("b"), vec![2u8; 100]).unwrap();
    fs::write(dir.path().join("c"), vec![2u8; 100]).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(estimated_bytes_freed(&report.groups), 100);

    let code = run(&["sweep", dir.path().to_str().unwrap()], &out).unwrap();
    assert_eq!(code, ExitCode::Success);

    let b = dir.path().join("b").canonicalize().unwrap();
    let c = dir.path().join("c");
    assert!(is_symlink(&c));
    assert_eq!(fs::read_link(&c).unwrap(), b);
    assert!(!is_symlink(&b));
    assert!(!is_symlink(&dir.path().join("a")));
    assert_eq!(fs::read(&c).unwrap(), vec![2u8; 100]);
}

#[test]
fn test_sweep_removes_empty_file() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("empty"), b"").unwrap();

    run(&["sweep", dir.path().to_str().unwrap()], &out).unwrap();

    assert!(!dir.path().join("empty").exists());
    let results = fs::read_to_string(out.path().join(RESULTS_FILE_NAME)).unwrap();
    assert!(results.starts_with("[EMPTY FILES]\n"));
}

#[test]
fn test_sweep_ignore_empty_keeps_empty_file() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("empty"), b"").unwrap();

    run(
        &["sweep", dir.path().to_str().unwrap(), "--ignore-empty"],
        &out,
    )
    .unwrap();

    assert!(dir.path().join("empty").exists());
}

#[test]
fn test_scan_does_not_mutate() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("empty"), b"").unwrap();
    fs::write(dir.path().join("b"), b"twin").unwrap();
    fs::write(dir.path().join("c"), b"twin").unwrap();

    run(&["scan", dir.path().to_str().unwrap()], &out).unwrap();

    assert!(dir.path().join("empty").exists());
    assert!(!is_symlink(&dir.path().join("c")));
    assert!(out.path().join(RESULTS_FILE_NAME).exists());
}

#[test]
fn test_missing_target_fails_without_mutation() {
    let out = tempdir().unwrap();

    let result = run(&["sweep", "/non/existent/broom/target"], &out);

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("does not exist"));
    assert!(!out.path().join(RESULTS_FILE_NAME).exists());
}

#[test]
fn test_no_target_path_is_an_error() {
    let out = tempdir().unwrap();
    assert!(run(&[], &out).is_err());
}

#[test]
fn test_unwritable_output_directory_is_an_error() {
    let dir = tempdir().unwrap();
    let config_dir = tempdir().unwrap();
    let config_path = config_dir.path().join("config.toml");
    fs::write(dir.path().join("file"), b"x").unwrap();
    fs::write(&config_path, "").unwrap();
    let cli = Cli::try_parse_from([
        "broom",
        "-q",
        dir.path().to_str().unwrap(),
        "-o",
        "/non/existent/broom/output",
        "--config",
        config_path.to_str().unwrap(),
    ])
    .unwrap();

    let err = broom::run_app(cli).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to save scan results"));
}

#[cfg(unix)]
#[test]
fn test_sweep_is_idempotent() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("b"), b"twin").unwrap();
    fs::write(dir.path().join("c"), b"twin").unwrap();

    run(&["sweep", dir.path().to_str().unwrap()], &out).unwrap();
    // The link is no longer tracked, so a second sweep finds nothing to do.
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_remediation_functions_directly() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("e1"), b"").unwrap();
    fs::write(dir.path().join("e2"), b"").unwrap();
    fs::write(dir.path().join("d1"), b"dup!").unwrap();
    fs::write(dir.path().join("d2"), b"dup!").unwrap();
    fs::write(dir.path().join("d3"), b"dup!").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let removed = remove_empty_files(&report.empty_files, None);
    assert_eq!(removed.removed.len(), 2);

    let linked = remove_duplicates_make_symlinks(&report.groups, None);
    assert_eq!(linked.linked.len(), 2);
    assert_eq!(linked.bytes_freed, 8);
    assert!(linked.all_succeeded());
}

#[test]
fn test_sweep_leaves_different_sizes_alone() {
    // a and c match at every sampled offset but c is five times larger.
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("a"), vec![0u8; 1000]).unwrap();
    fs::write(dir.path().join("b"), vec![1u8; 1000]).unwrap();
    fs::write(dir.path().join("c"), vec![0u8; 5000]).unwrap();
    fs::write(dir.path().join("d"), vec![2u8; 5000]).unwrap();

    run(&["sweep", dir.path().to_str().unwrap()], &out).unwrap();

    let c = dir.path().join("c");
    assert!(!is_symlink(&c));
    assert_eq!(fs::read(&c).unwrap(), vec![0u8; 5000]);
    let results = fs::read_to_string(out.path().join(RESULTS_FILE_NAME)).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_command_line_corrects_invalid_config() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("file"), b"x").unwrap();
    let config = "[sampling]\npiece_count = 0\n";

    assert!(run_with_config(&["scan", dir.path().to_str().unwrap()], &out, config).is_err());

    let code = run_with_config(
        &["scan", dir.path().to_str().unwrap(), "--piece-count", "3"],
        &out,
        config,
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("file"), b"x").unwrap();
    let cli = Cli::try_parse_from([
        "broom",
        "-q",
        dir.path().to_str().unwrap(),
        "--config",
        "/non/existent/broom/config.toml",
    ])
    .unwrap();

    let err = broom::run_app(cli).unwrap_err();
    assert!(format!("{err:#}").contains("Configuration file not found"));
}
