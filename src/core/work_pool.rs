//! Bounded-concurrency dispatcher over a [`TaskQueue`].
//!
//! `WorkPool` keeps a position-addressable queue of tasks that callers may
//! edit at any time. [`WorkPool::run_and_wait`] drains that queue on the
//! calling thread, launching each task on its own named OS thread once one of
//! `max_workers` admission slots is free, and returns only at quiescence:
//! queue empty and nothing in flight.
//!
//! # Design
//!
//! - **Admission**: a bounded channel acts as the semaphore; the dispatch
//!   loop is the only place that blocks on it
//! - **Join**: a `parking_lot` Mutex + Condvar counter, woken both by task
//!   completion and by inserts so work queued mid-join is picked up
//! - **Faults**: a panicking task still releases its slot; the dispatch loop
//!   stops admitting, waits for tasks already in flight, and re-raises the
//!   first panic payload. Tasks still queued stay queued
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use workpool::WorkPool;
//!
//! let pool = WorkPool::new(2).unwrap();
//! let done = Arc::new(AtomicUsize::new(0));
//! for _ in 0..5 {
//!     let done = Arc::clone(&done);
//!     pool.insert(move || {
//!         done.fetch_add(1, Ordering::SeqCst);
//!     });
//! }
//! pool.run_and_wait();
//! assert_eq!(done.load(Ordering::SeqCst), 5);
//! ```

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::WorkPoolConfig;

use super::admission::{AdmissionSlots, JoinCounter, JoinWait};
use super::{PoolError, Task, TaskId, TaskQueue};

thread_local! {
    /// Key of the pool whose task is running on this thread, 0 otherwise.
    static CURRENT_POOL: Cell<usize> = const { Cell::new(0) };
}

/// Lifecycle phase of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPhase {
    /// No `run_and_wait` in progress.
    Idle,
    /// The dispatch loop is pulling tasks from the queue.
    Draining,
    /// The queue is empty; waiting for in-flight tasks.
    Quiescing,
}

impl PoolPhase {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Draining => 1,
            Self::Quiescing => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Draining,
            2 => Self::Quiescing,
            _ => Self::Idle,
        }
    }
}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Concurrency limit.
    pub max_workers: usize,
    /// Tasks currently executing.
    pub active_tasks: u64,
    /// Tasks waiting in the queue.
    pub queued_tasks: usize,
    /// Total tasks inserted.
    pub submitted_tasks: u64,
    /// Total tasks that returned normally.
    pub completed_tasks: u64,
    /// Total tasks that panicked.
    pub failed_tasks: u64,
}

/// Lock-free counters behind [`PoolStats`].
#[derive(Debug, Default)]
struct PoolCounters {
    active_tasks: AtomicU64,
    submitted_tasks: AtomicU64,
    completed_tasks: AtomicU64,
    failed_tasks: AtomicU64,
}

type PanicPayload = Box<dyn Any + Send + 'static>;

struct Shared {
    config: WorkPoolConfig,
    queue: TaskQueue,
    slots: AdmissionSlots,
    join: JoinCounter,
    counters: PoolCounters,
    phase: AtomicU8,
    /// Serializes overlapping `run_and_wait` calls from different threads.
    drain_lock: Mutex<()>,
    /// First panic raised by a task during the current run.
    fault: Mutex<Option<PanicPayload>>,
    /// Set with `fault`; read by the dispatch loop before each admission.
    faulted: AtomicBool,
    task_id_counter: AtomicU64,
}

impl Shared {
    fn key(&self) -> usize {
        std::ptr::from_ref(self) as usize
    }

    fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }

    fn set_phase(&self, phase: PoolPhase) {
        self.phase.store(phase.as_u8(), Ordering::Release);
    }

    fn next_task<F>(&self, work: F) -> Task
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.task_id_counter.fetch_add(1, Ordering::Relaxed);
        Task::new(id, work)
    }

    fn after_insert(&self, task_id: TaskId) {
        self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
        self.join.signal_new_work();
        debug!(task_id = task_id, "Task inserted into work pool");
    }

    /// Run `task` on the current thread and settle its accounting.
    fn execute(&self, task: &Task) {
        let previous = CURRENT_POOL.replace(self.key());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run()));
        CURRENT_POOL.set(previous);

        self.counters.active_tasks.fetch_sub(1, Ordering::Relaxed);
        match outcome {
            Ok(()) => {
                self.counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
                debug!(task_id = task.id(), "Task completed");
            }
            Err(payload) => {
                self.counters.failed_tasks.fetch_add(1, Ordering::Relaxed);
                error!(
                    task_id = task.id(),
                    panic = %panic_message(&*payload),
                    "Task panicked"
                );
                let mut fault = self.fault.lock();
                if fault.is_none() {
                    *fault = Some(payload);
                }
                self.faulted.store(true, Ordering::Release);
            }
        }

        self.slots.release();
        self.join.done();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Work pool running at most `max_workers` tasks at once.
///
/// Cloning yields another handle to the same pool, which is how a task
/// inserts follow-up work into the pool that is running it.
#[derive(Clone)]
pub struct WorkPool {
    shared: Arc<Shared>,
}

impl WorkPool {
    /// Create a pool with the given concurrency limit and default thread
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if `max_workers` is 0.
    pub fn new(max_workers: usize) -> Result<Self, PoolError> {
        Self::with_config(WorkPoolConfig::new().with_max_workers(max_workers))
    }

    /// Create a pool from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the configuration is invalid.
    pub fn with_config(config: WorkPoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        info!(
            max_workers = config.max_workers,
            thread_stack_size = config.thread_stack_size,
            "WorkPool initialized"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                slots: AdmissionSlots::new(config.max_workers),
                config,
                queue: TaskQueue::new(),
                join: JoinCounter::new(),
                counters: PoolCounters::default(),
                phase: AtomicU8::new(PoolPhase::Idle.as_u8()),
                drain_lock: Mutex::new(()),
                fault: Mutex::new(None),
                faulted: AtomicBool::new(false),
                task_id_counter: AtomicU64::new(0),
            }),
        })
    }

    /// Append a task to the back of the queue.
    pub fn insert<F>(&self, work: F) -> TaskId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let task = self.shared.next_task(work);
        let task_id = task.id();
        self.shared.queue.push_back(task);
        self.shared.after_insert(task_id);
        task_id
    }

    /// Insert a task at `position`; see [`TaskQueue::insert_at`].
    pub fn insert_at<F>(&self, work: F, position: isize) -> TaskId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let task = self.shared.next_task(work);
        let task_id = task.id();
        self.shared.queue.insert_at(task, position);
        self.shared.after_insert(task_id);
        task_id
    }

    /// Snapshot of the queued tasks, front to back.
    #[must_use]
    pub fn list(&self) -> Vec<Task> {
        self.shared.queue.snapshot()
    }

    /// Drop the queued task at `index`. Returns `false` if out of range.
    pub fn remove(&self, index: isize) -> bool {
        let removed = self.shared.queue.remove(index);
        if removed {
            debug!(index = index, "Task removed from work pool");
        }
        removed
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Whether no tasks are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    /// Concurrency limit.
    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.shared.config.max_workers
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PoolPhase {
        PoolPhase::from_u8(self.shared.phase.load(Ordering::Acquire))
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let counters = &self.shared.counters;
        PoolStats {
            max_workers: self.shared.config.max_workers,
            active_tasks: counters.active_tasks.load(Ordering::Relaxed),
            queued_tasks: self.shared.queue.len(),
            submitted_tasks: counters.submitted_tasks.load(Ordering::Relaxed),
            completed_tasks: counters.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: counters.failed_tasks.load(Ordering::Relaxed),
        }
    }

    /// Drain the queue and block until the pool is quiescent.
    ///
    /// Tasks inserted while this runs, including by running tasks, are
    /// admitted in the same call. A call from another thread while one is
    /// active waits for it to finish; a call from inside one of this pool's
    /// own tasks returns immediately and leaves the draining to the active
    /// call. That check is per thread: a helper thread spawned by a task,
    /// calling this on the same pool while the task joins it, blocks until
    /// the active call returns and so deadlocks.
    ///
    /// # Panics
    ///
    /// Re-raises the first panic of any task run during this call. Once a
    /// task has panicked no further tasks are admitted; tasks already in
    /// flight are joined first and the rest stay in the queue.
    pub fn run_and_wait(&self) {
        let shared = &self.shared;
        if CURRENT_POOL.get() == shared.key() {
            debug!("run_and_wait called from a pool task; deferring to the active drain");
            return;
        }

        let _drain = shared.drain_lock.lock();
        if shared.queue.is_empty() {
            return;
        }

        info!(
            queued = shared.queue.len(),
            max_workers = shared.config.max_workers,
            "Draining work pool"
        );

        loop {
            shared.set_phase(PoolPhase::Draining);
            let seen = shared.join.generation();
            while !shared.is_faulted() {
                let Some(task) = shared.queue.pop_front() else {
                    break;
                };
                self.admit(task);
            }

            shared.set_phase(PoolPhase::Quiescing);
            if shared.is_faulted() {
                shared.join.wait_idle();
                break;
            }
            if shared.join.wait(seen) == JoinWait::Quiescent {
                break;
            }
        }
        shared.set_phase(PoolPhase::Idle);

        let stats = self.stats();
        info!(
            completed = stats.completed_tasks,
            failed = stats.failed_tasks,
            "Work pool quiescent"
        );

        let fault = shared.fault.lock().take();
        shared.faulted.store(false, Ordering::Release);
        if let Some(payload) = fault {
            warn!(left_queued = shared.queue.len(), "Work pool run aborted by task panic");
            panic::resume_unwind(payload);
        }
    }

    /// Take a slot and launch `task` on its own thread.
    ///
    /// A task that loses the race with a panic is put back at the front.
    fn admit(&self, task: Task) {
        let shared = &self.shared;
        shared.slots.acquire();
        if shared.is_faulted() {
            shared.slots.release();
            shared.queue.insert_at(task, -1);
            return;
        }
        shared.join.add();
        shared.counters.active_tasks.fetch_add(1, Ordering::Relaxed);

        let task_id = task.id();
        debug!(
            task_id = task_id,
            in_flight = shared.slots.in_use(),
            "Admitting task"
        );

        let spawned = {
            let shared = Arc::clone(shared);
            let task = task.clone();
            thread::Builder::new()
                .name(format!("{}-{task_id}", shared.config.thread_name_prefix))
                .stack_size(shared.config.thread_stack_size)
                .spawn(move || shared.execute(&task))
        };

        if let Err(e) = spawned {
            error!(
                task_id = task_id,
                error = %e,
                "Failed to spawn task thread; running inline"
            );
            shared.execute(&task);
        }
    }
}

impl fmt::Debug for WorkPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkPool")
            .field("max_workers", &self.shared.config.max_workers)
            .field("phase", &self.phase())
            .field("queued", &self.shared.queue.len())
            .field("in_flight", &self.shared.join.in_flight())
            .finish()
    }
}
