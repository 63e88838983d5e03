//! CSV-to-JSON directory converter built on [`WorkPool`](crate::core::WorkPool).
//!
//! Each matching input file becomes one pool task. A file that cannot be
//! converted is logged and counted; the rest of the directory proceeds.

pub mod csv_json;
pub mod directory;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::core::PoolError;

pub use csv_json::{convert_file, convert_file_with_delimiter, ConvertedFile};
pub use directory::{convert_directory, submit_directory};

/// Errors produced while converting files.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Filesystem failure on `path`.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The input could not be parsed as delimited text.
    #[error("error reading CSV file {}: {source}", .path.display())]
    Csv {
        /// Input file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
    /// The records could not be written as JSON.
    #[error("error encoding JSON data to {}: {source}", .path.display())]
    Json {
        /// Output file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The input has no header row.
    #[error("no data found in CSV file {}", .path.display())]
    Empty {
        /// Input file.
        path: PathBuf,
    },
    /// Converter configuration failed validation.
    #[error("invalid converter configuration: {0}")]
    Config(String),
    /// The pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Shared tallies updated by conversion tasks.
#[derive(Debug, Default)]
pub struct ConversionSummary {
    converted: AtomicUsize,
    failed: AtomicUsize,
    records: AtomicUsize,
    skipped_rows: AtomicUsize,
}

/// Point-in-time copy of a [`ConversionSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Files written successfully.
    pub converted: usize,
    /// Files that failed.
    pub failed: usize,
    /// Records written across all files.
    pub records: usize,
    /// Rows dropped for a field-count mismatch.
    pub skipped_rows: usize,
}

impl ConversionSummary {
    /// Empty tallies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_success(&self, file: &ConvertedFile) {
        self.converted.fetch_add(1, Ordering::Relaxed);
        self.records.fetch_add(file.records, Ordering::Relaxed);
        self.skipped_rows.fetch_add(file.skipped_rows, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current tallies.
    #[must_use]
    pub fn report(&self) -> ConversionReport {
        ConversionReport {
            converted: self.converted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            skipped_rows: self.skipped_rows.load(Ordering::Relaxed),
        }
    }
}
