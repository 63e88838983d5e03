//! # workpool
//!
//! A bounded-concurrency work pool with an editable task queue.
//!
//! Tasks are argument-less closures queued in a [`TaskQueue`](crate::core::TaskQueue)
//! that callers can append to, insert into at any position, list, and remove
//! from, before and during execution. [`WorkPool::run_and_wait`] drains the
//! queue on the calling thread, running at most `max_workers` tasks at once on
//! dedicated OS threads, and returns only when the queue is empty and every
//! admitted task has returned, including tasks queued while draining.
//!
//! ## Key Features
//!
//! - **Position-addressable queue**: negative positions insert at the front,
//!   positions past the end append
//! - **Bounded admission**: the dispatch loop blocks when all slots are busy;
//!   inserts never do
//! - **Re-entrant submission**: running tasks can queue more work on the same
//!   pool and the current drain picks it up
//! - **Fault propagation**: a panicking task fails the whole `run_and_wait`
//!   once the pool is quiescent
//!
//! ```rust
//! use workpool::WorkPool;
//!
//! let pool = WorkPool::new(3).unwrap();
//! let child = pool.clone();
//! pool.insert(move || {
//!     child.insert(|| println!("queued from inside a task"));
//! });
//! pool.insert_at(|| println!("runs first"), -1);
//! pool.run_and_wait();
//! assert!(pool.is_empty());
//! ```
//!
//! The [`convert`] module is a complete client: it converts a directory of CSV
//! files to JSON with one pool task per file, and backs the `csv2json` binary.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Task queue, admission accounting, and the pool dispatcher.
pub mod core;
/// Configuration models for the pool and the converter.
pub mod config;
/// CSV-to-JSON directory converter.
pub mod convert;
/// Shared utilities.
pub mod util;

pub use crate::core::{PoolError, PoolPhase, PoolStats, Task, TaskId, TaskQueue, WorkPool};
