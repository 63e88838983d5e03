//! Directory scan: one pool task per matching input file.

use std::ffi::OsStr;
use std::fs::{self, DirEntry};
use std::sync::Arc;

use tracing::{error, info};

use crate::config::ConverterConfig;
use crate::core::WorkPool;

use super::{convert_file_with_delimiter, ConversionReport, ConversionSummary, ConvertError};

/// Queue a conversion task on `pool` for every matching file in
/// `config.input_dir`, in file-name order.
///
/// `<input_dir>/<name>` is written to `<output_dir>/<name>.json`. The output
/// directory is created if missing. Tasks report into `summary` and never
/// panic on conversion failures.
///
/// Returns the number of tasks queued.
///
/// # Errors
///
/// Returns `ConvertError::Io` if the output directory cannot be created or
/// the input directory cannot be listed.
pub fn submit_directory(
    pool: &WorkPool,
    config: &ConverterConfig,
    summary: &Arc<ConversionSummary>,
) -> Result<usize, ConvertError> {
    fs::create_dir_all(&config.output_dir).map_err(|source| ConvertError::Io {
        path: config.output_dir.clone(),
        source,
    })?;

    let input_err = |source| ConvertError::Io {
        path: config.input_dir.clone(),
        source,
    };
    let mut entries = fs::read_dir(&config.input_dir)
        .map_err(input_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(input_err)?;
    entries.sort_by_key(DirEntry::file_name);

    let mut submitted = 0;
    for entry in entries {
        let csv_path = entry.path();
        let matches = csv_path.extension().and_then(OsStr::to_str) == Some(config.extension.as_str());
        if !matches || !csv_path.is_file() {
            continue;
        }

        let mut json_name = entry.file_name();
        json_name.push(".json");
        let json_path = config.output_dir.join(json_name);

        let delimiter = config.delimiter;
        let summary = Arc::clone(summary);
        pool.insert(move || {
            match convert_file_with_delimiter(&csv_path, &json_path, delimiter) {
                Ok(file) => {
                    info!(
                        input = %csv_path.display(),
                        output = %json_path.display(),
                        records = file.records,
                        skipped_rows = file.skipped_rows,
                        "Successfully converted file"
                    );
                    summary.record_success(&file);
                }
                Err(e) => {
                    error!(input = %csv_path.display(), error = %e, "Error processing file");
                    summary.record_failure();
                }
            }
        });
        submitted += 1;
    }

    Ok(submitted)
}

/// Convert every matching file in `config.input_dir` using a pool of
/// `config.max_workers` and wait for all of them.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the directories are
/// unusable. Per-file failures are only counted in the report.
pub fn convert_directory(config: &ConverterConfig) -> Result<ConversionReport, ConvertError> {
    config.validate().map_err(ConvertError::Config)?;
    let pool = WorkPool::with_config(config.pool_config())?;
    let summary = Arc::new(ConversionSummary::new());

    let submitted = submit_directory(&pool, config, &summary)?;
    info!(
        input_dir = %config.input_dir.display(),
        files = submitted,
        "Queued files for conversion"
    );

    pool.run_and_wait();

    let report = summary.report();
    info!(
        converted = report.converted,
        failed = report.failed,
        records = report.records,
        "All files processed"
    );
    Ok(report)
}
