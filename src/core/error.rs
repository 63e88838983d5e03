//! Error types for pool operations.

use thiserror::Error;

/// Errors produced when constructing a `WorkPool`.
///
/// Queue operations and `run_and_wait` have no error channel; an invalid
/// removal index is reported through a `false` return instead.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
