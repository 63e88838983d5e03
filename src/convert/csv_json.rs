//! Single-file conversion: header row to field names, one object per row.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::ReaderBuilder;
use tracing::warn;

use super::ConvertError;

/// Outcome of converting one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertedFile {
    /// Records written.
    pub records: usize,
    /// Rows dropped because their field count differed from the header.
    pub skipped_rows: usize,
}

/// Convert a comma-delimited file; see [`convert_file_with_delimiter`].
///
/// # Errors
///
/// See [`convert_file_with_delimiter`].
pub fn convert_file(csv_path: &Path, json_path: &Path) -> Result<ConvertedFile, ConvertError> {
    convert_file_with_delimiter(csv_path, json_path, b',')
}

/// Read `csv_path` and write its rows to `json_path` as a JSON array.
///
/// The first row names the fields. Every later row with the same number of
/// fields becomes one object with keys in sorted order; other rows are
/// skipped with a warning. Output is indented by two spaces and ends with a
/// newline. A header with no rows writes `[]`.
///
/// # Errors
///
/// - `ConvertError::Csv` if the input cannot be opened or parsed
/// - `ConvertError::Empty` if the input has no header row
/// - `ConvertError::Io` / `ConvertError::Json` if the output cannot be written
pub fn convert_file_with_delimiter(
    csv_path: &Path,
    json_path: &Path,
    delimiter: u8,
) -> Result<ConvertedFile, ConvertError> {
    let csv_err = |source| ConvertError::Csv {
        path: csv_path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(csv_path)
        .map_err(csv_err)?;

    let mut rows = reader.records();
    let headers = match rows.next() {
        Some(row) => row.map_err(csv_err)?,
        None => {
            return Err(ConvertError::Empty {
                path: csv_path.to_path_buf(),
            })
        }
    };

    let mut records: Vec<BTreeMap<String, String>> = Vec::new();
    let mut skipped_rows = 0;
    for row in rows {
        let row = row.map_err(csv_err)?;
        if row.len() != headers.len() {
            skipped_rows += 1;
            warn!(
                file = %csv_path.display(),
                line = row.position().map_or(0, csv::Position::line),
                expected = headers.len(),
                found = row.len(),
                "Skipping row with mismatched column count"
            );
            continue;
        }
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        );
    }

    write_json(json_path, &records)?;

    Ok(ConvertedFile {
        records: records.len(),
        skipped_rows,
    })
}

fn write_json(json_path: &Path, records: &[BTreeMap<String, String>]) -> Result<(), ConvertError> {
    let io_err = |source| ConvertError::Io {
        path: json_path.to_path_buf(),
        source,
    };

    let file = File::create(json_path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|source| ConvertError::Json {
        path: json_path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)
}
