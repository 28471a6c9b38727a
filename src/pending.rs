//! Completion tracking for fork-join work on the pool.
//!
//! Workers in a [`WorkQueue`](crate::WorkQueue) never terminate between
//! tasks, so there is no per-task thread to join. A [`PendingTracker`] fills
//! the gap: a count of in-flight tasks that the submitter can block on until
//! it returns to zero.
//!
//! The ordering discipline is load-bearing. The count is incremented
//! *before* a task is handed to the queue and decremented *after* the task
//! has merged its results and submitted any children it discovered. Either
//! ordering reversed opens a window where the count reads zero while queued
//! work still exists, waking the submitter over incomplete results. The RAII
//! [`PendingGuard`] keeps the decrement tied to the task's lifetime, so even
//! a panicking task releases its slot and the submitter cannot hang.
//!
//! Each tracker is scoped to one logical fork-join operation. Two unrelated
//! root submissions on the same tracker would wake each other spuriously;
//! give them independent trackers instead (they are a single allocation).

use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;

use tracing::trace;

// -----------------------------------------------------------------------------
// Pending tracker

/// Counts in-flight tasks for one fork-join operation and lets a submitter
/// block until all of them (and their descendants) have finished.
///
/// Cloning is cheap and shares the same count, so tasks can carry a clone of
/// the tracker into the pool.
#[derive(Clone, Default)]
pub struct PendingTracker {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    pending: Mutex<usize>,
    /// Signaled when the count returns to zero.
    all_done: Condvar,
}

impl PendingTracker {
    /// Creates a tracker with a count of zero.
    pub fn new() -> PendingTracker {
        PendingTracker::default()
    }

    /// Records one new unit of pending work.
    ///
    /// Call this before handing the corresponding task to the work queue,
    /// never after; otherwise the count can transiently reach zero while the
    /// task sits queued but unstarted.
    pub fn increment(&self) {
        let mut pending = self.inner.pending.lock().unwrap();
        *pending += 1;
        trace!("pending count incremented to {}", *pending);
    }

    /// Records the completion of one unit of work, waking waiters if the
    /// count reaches zero.
    ///
    /// Call this only after the task has merged its local results into the
    /// shared state and submitted any children it discovered.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero; an unmatched decrement is a
    /// usage error.
    pub fn decrement(&self) {
        let mut pending = self.inner.pending.lock().unwrap();
        assert!(*pending > 0, "pending count decremented below zero");
        *pending -= 1;
        trace!("pending count decremented to {}", *pending);

        if *pending == 0 {
            self.inner.all_done.notify_all();
        }
    }

    /// Registers one unit of pending work and returns a guard that releases
    /// it when dropped.
    ///
    /// Prefer this over manual [`increment`]/[`decrement`] pairs inside
    /// tasks: a task that panics mid-way still drops the guard during
    /// unwinding, so the tracker cannot leak a count and hang the submitter.
    ///
    /// [`increment`]: PendingTracker::increment
    /// [`decrement`]: PendingTracker::decrement
    pub fn guard(&self) -> PendingGuard {
        self.increment();
        PendingGuard {
            tracker: self.clone(),
        }
    }

    /// Blocks the calling thread until the pending count is zero.
    ///
    /// Loops on the condition variable, so spurious wakeups re-check the
    /// count. May be called again after new work has been submitted; the
    /// count legitimately becomes nonzero between fork-join rounds.
    pub fn wait(&self) {
        let mut pending = self.inner.pending.lock().unwrap();
        while *pending != 0 {
            trace!("waiting on {} pending task(s)", *pending);
            pending = self.inner.all_done.wait(pending).unwrap();
        }
    }

    /// Returns the current pending count. Only a snapshot; it may change
    /// before the caller can act on it.
    pub fn pending(&self) -> usize {
        *self.inner.pending.lock().unwrap()
    }
}

// -----------------------------------------------------------------------------
// Pending guard

/// RAII registration of one unit of pending work; decrements the tracker on
/// drop. Created by [`PendingTracker::guard`].
pub struct PendingGuard {
    tracker: PendingTracker,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.tracker.decrement();
    }
}

// -----------------------------------------------------------------------------
// Tests
