//! Pool and converter configuration structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default stack size for task threads (2 MiB, the std default).
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Default prefix for task thread names.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "workpool-task";

fn default_max_workers() -> usize {
    num_cpus::get()
}

const fn default_thread_stack_size() -> usize {
    DEFAULT_THREAD_STACK_SIZE
}

fn default_thread_name_prefix() -> String {
    DEFAULT_THREAD_NAME_PREFIX.into()
}

/// Configuration for a `WorkPool`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPoolConfig {
    /// Maximum number of tasks executing at the same time.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Stack size in bytes for each task thread.
    #[serde(default = "default_thread_stack_size")]
    pub thread_stack_size: usize,
    /// Task threads are named `{prefix}-{task_id}`.
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

impl Default for WorkPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

impl WorkPoolConfig {
    /// Configuration with one worker per CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the task thread stack size.
    #[must_use]
    pub fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Set the task thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        if self.thread_stack_size == 0 {
            return Err("thread_stack_size must be greater than 0".into());
        }
        if self.thread_name_prefix.is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message on malformed JSON or failed validation.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Environment variable naming the input directory.
pub const ENV_INPUT_DIR: &str = "CSV2JSON_INPUT_DIR";
/// Environment variable naming the output directory.
pub const ENV_OUTPUT_DIR: &str = "CSV2JSON_OUTPUT_DIR";
/// Environment variable selecting the input file extension.
pub const ENV_EXTENSION: &str = "CSV2JSON_EXTENSION";
/// Environment variable selecting the field delimiter.
pub const ENV_DELIMITER: &str = "CSV2JSON_DELIMITER";
/// Environment variable setting the concurrency limit.
pub const ENV_WORKERS: &str = "CSV2JSON_WORKERS";

/// Configuration for the CSV-to-JSON directory converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Directory scanned for input files.
    pub input_dir: PathBuf,
    /// Directory receiving `<name>.json` outputs; created if missing.
    pub output_dir: PathBuf,
    /// Input file extension, without the dot.
    pub extension: String,
    /// Single-byte field delimiter.
    pub delimiter: u8,
    /// Maximum files converted at the same time.
    pub max_workers: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./csv_files"),
            output_dir: PathBuf::from("./output_json_files"),
            extension: "csv".into(),
            delimiter: b',',
            max_workers: default_max_workers(),
        }
    }
}

impl ConverterConfig {
    /// Build from `CSV2JSON_*` environment variables, loading `.env` first.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a message when a variable is present but unparseable, or the
    /// result fails validation.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();

        if let Ok(dir) = std::env::var(ENV_INPUT_DIR) {
            cfg.input_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Ok(ext) = std::env::var(ENV_EXTENSION) {
            cfg.extension = ext.trim_start_matches('.').to_string();
        }
        if let Ok(delim) = std::env::var(ENV_DELIMITER) {
            cfg.delimiter = parse_delimiter(&delim)?;
        }
        if let Ok(workers) = std::env::var(ENV_WORKERS) {
            cfg.max_workers = workers
                .parse()
                .map_err(|e| format!("{ENV_WORKERS}: {e}"))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        if self.extension.is_empty() {
            return Err("extension must not be empty".into());
        }
        if self.delimiter == b'"' || self.delimiter == b'\n' || self.delimiter == b'\r' {
            return Err(format!("delimiter {:?} is not allowed", self.delimiter as char));
        }
        Ok(())
    }

    /// Pool configuration derived from this converter configuration.
    #[must_use]
    pub fn pool_config(&self) -> WorkPoolConfig {
        WorkPoolConfig::new()
            .with_max_workers(self.max_workers)
            .with_thread_name_prefix("csv2json")
    }
}

/// Parse a delimiter given as a single ASCII character or the word `tab`.
///
/// # Errors
///
/// Returns a message when the input is not exactly one ASCII byte.
pub fn parse_delimiter(input: &str) -> Result<u8, String> {
    if input.eq_ignore_ascii_case("tab") || input == "\\t" {
        return Ok(b'\t');
    }
    match input.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be a single ASCII character, got {input:?}")),
    }
}
