//! Task handle stored in the queue.

use std::fmt;
use std::sync::Arc;

/// Identifier assigned to a task by the pool that accepted it.
pub type TaskId = u64;

/// An opaque, argument-less unit of work.
///
/// Cloning a `Task` clones the handle, not the closure, so the snapshots
/// returned by [`TaskQueue::snapshot`](super::TaskQueue::snapshot) share the
/// underlying work with the queue but not its ordering.
#[derive(Clone)]
pub struct Task {
    id: TaskId,
    work: Arc<dyn Fn() + Send + Sync + 'static>,
}

impl Task {
    /// Wrap a closure under the given identifier.
    pub fn new<F>(id: TaskId, work: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id,
            work: Arc::new(work),
        }
    }

    /// Identifier assigned at insertion.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Execute the task on the current thread.
    pub fn run(&self) {
        (self.work)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish_non_exhaustive()
    }
}
