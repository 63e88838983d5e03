//! Admission slots and the join counter.
//!
//! The two primitives are synchronized independently of each other and of
//! the task queue. Neither is ever locked while the other is held.

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};

/// Counting semaphore with `capacity` permits.
///
/// Backed by a bounded channel: acquiring sends a token and blocks while the
/// channel is full, releasing takes one token back out.
#[derive(Debug)]
pub(crate) struct AdmissionSlots {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl AdmissionSlots {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    /// Block until a slot is free and take it.
    pub(crate) fn acquire(&self) {
        // Both ends live in `self`, so the channel cannot be disconnected.
        let _ = self.tx.send(());
    }

    /// Return a slot taken by [`acquire`](Self::acquire).
    pub(crate) fn release(&self) {
        let _ = self.rx.try_recv();
    }

    /// Slots currently taken.
    pub(crate) fn in_use(&self) -> usize {
        self.tx.len()
    }
}

#[derive(Debug, Default)]
struct JoinState {
    /// Admitted tasks that have not returned yet.
    in_flight: usize,
    /// Bumped on every insert so a quiescing waiter notices new work.
    generation: u64,
}

/// Result of waiting on a [`JoinCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JoinWait {
    /// No task in flight and nothing inserted since the observed generation.
    Quiescent,
    /// New work arrived; the caller should drain again.
    NewWork,
}

/// Admitted-but-not-completed counter with a condvar for the final join.
#[derive(Debug, Default)]
pub(crate) struct JoinCounter {
    state: Mutex<JoinState>,
    changed: Condvar,
}

impl JoinCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self) {
        self.state.lock().in_flight += 1;
    }

    pub(crate) fn done(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 {
            self.changed.notify_all();
        }
    }

    /// Record that a task was inserted into the queue.
    pub(crate) fn signal_new_work(&self) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        self.changed.notify_all();
    }

    pub(crate) fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Block until the counter reaches zero, ignoring inserts.
    pub(crate) fn wait_idle(&self) {
        let mut state = self.state.lock();
        while state.in_flight > 0 {
            self.changed.wait(&mut state);
        }
    }

    /// Block until the counter reaches zero or the generation moves past
    /// `seen`.
    pub(crate) fn wait(&self, seen: u64) -> JoinWait {
        let mut state = self.state.lock();
        while state.in_flight > 0 && state.generation == seen {
            self.changed.wait(&mut state);
        }
        if state.generation == seen {
            JoinWait::Quiescent
        } else {
            JoinWait::NewWork
        }
    }
}
