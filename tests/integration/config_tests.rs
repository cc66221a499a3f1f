use broom::config::{Config, ConfigError};
use broom::scanner::SamplingConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config.sampling, SamplingConfig::default());
    assert!(!config.ignore_empty);
    assert!(!config.skip_hidden);
}

#[test]
fn test_config_load_from_env() {
    // A test-only prefix keeps this from leaking into Config::load elsewhere.
    std::env::set_var("BROOMTEST_SAMPLING__PIECE_SIZE", "32");
    std::env::set_var("BROOMTEST_IGNORE_EMPTY", "true");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("BROOMTEST_").split("__"))
        .extract()
        .unwrap();

    assert_eq!(config.sampling.piece_size, 32);
    assert_eq!(config.sampling.piece_count, 3);
    assert!(config.ignore_empty);

    std::env::remove_var("BROOMTEST_SAMPLING__PIECE_SIZE");
    std::env::remove_var("BROOMTEST_IGNORE_EMPTY");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
ignore_empty = true
output_dir = "/var/tmp"

[sampling]
piece_size = 64
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&config_path).unwrap();

    assert!(config.ignore_empty);
    assert_eq!(config.output_dir, PathBuf::from("/var/tmp"));
    assert_eq!(config.sampling.piece_size, 64);
    assert_eq!(config.sampling.piece_count, 3);
}

#[test]
fn test_config_explicit_missing_file_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let result = Config::load_from_path(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_empty_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.sampling, SamplingConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_zero_piece_count_fails_validation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[sampling]\npiece_count = 0\n").unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "sampling = \"not a table\"").unwrap();

    let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract();
    assert!(result.is_err());
}

#[test]
fn test_config_save_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        skip_hidden: true,
        sampling: SamplingConfig::new(24, 5),
        ..Config::default()
    };
    config.save_to(&config_path).unwrap();

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("skip_hidden = true"));
    assert!(saved.contains("piece_count = 5"));
}
