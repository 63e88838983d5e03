//! Configuration models for the pool and the converter.

pub mod pool;

pub use pool::{parse_delimiter, ConverterConfig, WorkPoolConfig};
