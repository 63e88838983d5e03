//! Position-addressable FIFO of pending tasks.
//!
//! Every structural operation runs under a single `parking_lot::Mutex`, so
//! callers on different threads never observe a half-applied insert or
//! removal. Positions are signed: a negative insert position means "front",
//! while a negative removal index is simply out of range.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::Task;

/// Ordered queue of tasks waiting for admission.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task at the back.
    pub fn push_back(&self, task: Task) {
        self.tasks.lock().push_back(task);
    }

    /// Insert a task relative to the current contents.
    ///
    /// Negative positions insert at the front, positions at or past the end
    /// append, anything else lands immediately before the task currently at
    /// `position`.
    pub fn insert_at(&self, task: Task, position: isize) {
        let mut tasks = self.tasks.lock();
        match usize::try_from(position) {
            Err(_) => tasks.push_front(task),
            Ok(index) if index >= tasks.len() => tasks.push_back(task),
            Ok(index) => tasks.insert(index, task),
        }
    }

    /// Copy of the queued tasks, front to back.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.lock().iter().cloned().collect()
    }

    /// Remove the task at `index`.
    ///
    /// Returns `false` without touching the queue when `index` is negative or
    /// past the end.
    pub fn remove(&self, index: isize) -> bool {
        let Ok(index) = usize::try_from(index) else {
            return false;
        };
        self.tasks.lock().remove(index).is_some()
    }

    /// Take the head of the queue.
    pub(crate) fn pop_front(&self) -> Option<Task> {
        self.tasks.lock().pop_front()
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether the queue currently holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}
