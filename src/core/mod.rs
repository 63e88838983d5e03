//! Task queue, admission accounting, and the pool dispatcher.

mod admission;
pub mod error;
pub mod task;
pub mod task_queue;
pub mod work_pool;

pub use error::{AppResult, PoolError};
pub use task::{Task, TaskId};
pub use task_queue::TaskQueue;
pub use work_pool::{PoolPhase, PoolStats, WorkPool};
