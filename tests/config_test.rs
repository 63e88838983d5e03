//! Tests for configuration validation and loading

use std::path::PathBuf;

use workpool::config::pool::{ENV_DELIMITER, ENV_EXTENSION, ENV_INPUT_DIR, ENV_OUTPUT_DIR, ENV_WORKERS};
use workpool::config::{ConverterConfig, WorkPoolConfig};
use workpool::{PoolError, WorkPool};

#[test]
fn test_pool_config_validation() {
    let valid = WorkPoolConfig::new().with_max_workers(4);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_pool_config_invalid_max_workers() {
    let invalid = WorkPoolConfig::new().with_max_workers(0);
    assert!(invalid.validate().is_err());
    assert!(matches!(
        WorkPool::with_config(invalid),
        Err(PoolError::InvalidConfig(_))
    ));
}

#[test]
fn test_pool_config_invalid_stack_size() {
    let invalid = WorkPoolConfig::new().with_thread_stack_size(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_invalid_prefix() {
    let invalid = WorkPoolConfig::new().with_thread_name_prefix("");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_from_json() {
    let json = r#"{
        "max_workers": 3,
        "thread_stack_size": 65536,
        "thread_name_prefix": "io"
    }"#;

    let config = WorkPoolConfig::from_json_str(json).unwrap();
    assert_eq!(config.max_workers, 3);
    assert_eq!(config.thread_stack_size, 65536);
    assert_eq!(config.thread_name_prefix, "io");

    let round_trip = serde_json::to_string(&config).unwrap();
    assert_eq!(WorkPoolConfig::from_json_str(&round_trip).unwrap(), config);
}

#[test]
fn test_pool_config_from_json_rejects_zero() {
    let err = WorkPoolConfig::from_json_str(r#"{"max_workers": 0}"#).unwrap_err();
    assert_eq!(err, "max_workers must be greater than 0");
}

#[test]
fn test_pool_config_from_json_parse_error() {
    let err = WorkPoolConfig::from_json_str("{not json").unwrap_err();
    assert!(err.starts_with("parse error:"));
}

#[test]
fn test_converter_pool_config() {
    let config = ConverterConfig {
        max_workers: 5,
        ..ConverterConfig::default()
    };
    let pool = config.pool_config();
    assert_eq!(pool.max_workers, 5);
    assert_eq!(pool.thread_name_prefix, "csv2json");
}

// All environment manipulation lives in one test; the process environment is
// shared across the test harness threads.
#[test]
fn test_converter_config_from_env() {
    std::env::set_var(ENV_INPUT_DIR, "/tmp/in");
    std::env::set_var(ENV_OUTPUT_DIR, "/tmp/out");
    std::env::set_var(ENV_EXTENSION, ".tsv");
    std::env::set_var(ENV_DELIMITER, "tab");
    std::env::set_var(ENV_WORKERS, "3");

    let config = ConverterConfig::from_env().unwrap();
    assert_eq!(config.input_dir, PathBuf::from("/tmp/in"));
    assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(config.extension, "tsv");
    assert_eq!(config.delimiter, b'\t');
    assert_eq!(config.max_workers, 3);

    std::env::set_var(ENV_WORKERS, "zero");
    assert!(ConverterConfig::from_env().is_err());

    std::env::set_var(ENV_WORKERS, "0");
    assert!(ConverterConfig::from_env().is_err());

    for key in [ENV_INPUT_DIR, ENV_OUTPUT_DIR, ENV_EXTENSION, ENV_DELIMITER, ENV_WORKERS] {
        std::env::remove_var(key);
    }
    assert_eq!(ConverterConfig::from_env().unwrap(), ConverterConfig::default());
}
