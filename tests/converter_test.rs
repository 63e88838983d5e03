//! Integration tests for the CSV-to-JSON directory converter

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use workpool::config::ConverterConfig;
use workpool::convert::{convert_directory, submit_directory, ConversionReport, ConversionSummary};
use workpool::WorkPool;

fn config_for(root: &Path) -> ConverterConfig {
    ConverterConfig {
        input_dir: root.join("csv_files"),
        output_dir: root.join("output_json_files"),
        max_workers: 2,
        ..ConverterConfig::default()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_well_formed_and_ragged_files() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    fs::create_dir_all(&config.input_dir).unwrap();
    fs::write(
        config.input_dir.join("good.csv"),
        "id,name\n1,alpha\n2,beta\n",
    )
    .unwrap();
    fs::write(
        config.input_dir.join("ragged.csv"),
        "id,name\n1,alpha,extra\n2\n3,gamma\n",
    )
    .unwrap();

    let report = convert_directory(&config).unwrap();
    assert_eq!(
        report,
        ConversionReport {
            converted: 2,
            failed: 0,
            records: 3,
            skipped_rows: 2,
        }
    );

    assert_eq!(
        read_json(&config.output_dir.join("good.csv.json")),
        json!([{"id": "1", "name": "alpha"}, {"id": "2", "name": "beta"}])
    );
    assert_eq!(
        read_json(&config.output_dir.join("ragged.csv.json")),
        json!([{"id": "3", "name": "gamma"}])
    );
}

#[test]
fn test_bad_file_does_not_stop_others() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    fs::create_dir_all(&config.input_dir).unwrap();
    fs::write(config.input_dir.join("a.csv"), "k\nv\n").unwrap();
    fs::write(config.input_dir.join("b.csv"), "").unwrap();
    fs::write(config.input_dir.join("c.csv"), "k\nw\n").unwrap();

    let report = convert_directory(&config).unwrap();
    assert_eq!(report.converted, 2);
    assert_eq!(report.failed, 1);

    assert!(config.output_dir.join("a.csv.json").exists());
    assert!(!config.output_dir.join("b.csv.json").exists());
    assert!(config.output_dir.join("c.csv.json").exists());
}

#[test]
fn test_only_matching_files_are_submitted() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    fs::create_dir_all(config.input_dir.join("nested.csv")).unwrap();
    fs::write(config.input_dir.join("data.csv"), "a\n1\n").unwrap();
    fs::write(config.input_dir.join("notes.txt"), "a\n1\n").unwrap();
    fs::write(config.input_dir.join("upper.CSV"), "a\n1\n").unwrap();

    let pool = WorkPool::new(1).unwrap();
    let summary = Arc::new(ConversionSummary::new());
    let submitted = submit_directory(&pool, &config, &summary).unwrap();
    assert_eq!(submitted, 1);
    assert_eq!(pool.len(), 1);

    pool.run_and_wait();
    assert_eq!(summary.report().converted, 1);

    let outputs: Vec<_> = fs::read_dir(&config.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(outputs, vec!["data.csv.json".to_string()]);
}

#[test]
fn test_output_dir_is_created() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config_for(root.path());
    config.output_dir = root.path().join("deep").join("out");
    fs::create_dir_all(&config.input_dir).unwrap();

    let report = convert_directory(&config).unwrap();
    assert_eq!(report, ConversionReport::default());
    assert!(config.output_dir.is_dir());
}

#[test]
fn test_missing_input_dir_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    assert!(convert_directory(&config).is_err());
}

#[test]
fn test_custom_extension_and_delimiter() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config_for(root.path());
    config.extension = "tsv".into();
    config.delimiter = b'\t';
    fs::create_dir_all(&config.input_dir).unwrap();
    fs::write(config.input_dir.join("t.tsv"), "x\ty\n1\t2\n").unwrap();

    let report = convert_directory(&config).unwrap();
    assert_eq!(report.converted, 1);
    assert_eq!(
        read_json(&config.output_dir.join("t.tsv.json")),
        json!([{"x": "1", "y": "2"}])
    );
}

#[test]
fn test_many_files_with_small_pool() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    fs::create_dir_all(&config.input_dir).unwrap();
    for i in 0..20 {
        fs::write(
            config.input_dir.join(format!("f{i:02}.csv")),
            format!("n\n{i}\n"),
        )
        .unwrap();
    }

    let report = convert_directory(&config).unwrap();
    assert_eq!(report.converted, 20);
    assert_eq!(report.records, 20);
    assert_eq!(
        read_json(&config.output_dir.join("f07.csv.json")),
        json!([{"n": "7"}])
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config_for(root.path());
    config.max_workers = 0;
    assert!(convert_directory(&config).is_err());
}
