//! `csv2json`: convert a directory of CSV files to JSON on a bounded work pool.
//!
//! Settings come from `CSV2JSON_*` environment variables (a `.env` file is
//! loaded first) and may be overridden on the command line.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use workpool::config::{parse_delimiter, ConverterConfig};
use workpool::convert::convert_directory;
use workpool::core::AppResult;
use workpool::util::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "csv2json", version, about = "Convert a directory of CSV files to JSON")]
struct Cli {
    /// Directory containing the input files.
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Directory receiving `<name>.json` outputs.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Maximum number of files converted at the same time.
    #[arg(long)]
    workers: Option<usize>,
    /// Input file extension, without the dot.
    #[arg(long)]
    extension: Option<String>,
    /// Field delimiter: a single character, or `tab`.
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,
}

impl Cli {
    fn apply(self, config: &mut ConverterConfig) {
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        if let Some(ext) = self.extension {
            config.extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
    }
}

fn main() -> AppResult<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = ConverterConfig::from_env().map_err(anyhow::Error::msg)?;
    cli.apply(&mut config);

    let report = convert_directory(&config)
        .with_context(|| format!("failed to convert {}", config.input_dir.display()))?;

    if report.failed > 0 {
        warn!(failed = report.failed, "Some files could not be converted");
    }
    Ok(())
}
