//! Units of work executed by the pool, and handles for recovering their
//! results.
//!
//! A [`Task`] is fire-and-forget: it is boxed, handed to a worker, and
//! consumed by execution. For work that produces a value, `WorkQueue::submit`
//! pairs the task with a [`TaskHandle`] that the submitter can join on.
//!
//! [`Task`]: crate::Task
//! [`TaskHandle`]: crate::TaskHandle

use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::thread;

// -----------------------------------------------------------------------------
// Task

/// An opaque unit of work.
///
/// A task is owned exclusively by whichever worker executes it, and is
/// consumed by [`Task::run`]. Any `FnOnce() + Send + 'static` closure is a
/// task, which is the form nearly all callers use; the trait exists so the
/// queue can store tasks as trait objects.
pub trait Task: Send + 'static {
    /// Executes the task, consuming it.
    fn run(self: Box<Self>);
}

impl<F> Task for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (*self)();
    }
}

// -----------------------------------------------------------------------------
// Task handles

/// Shared state between a [`TaskHandle`] and the completion held by the task.
struct HandleState<R> {
    outcome: Mutex<Option<thread::Result<R>>>,
    finished: Condvar,
}

/// A handle to a task submitted with `WorkQueue::submit`, used to block for
/// its result.
///
/// The handle completes even when the task body panics; in that case
/// [`TaskHandle::join`] returns `Err` carrying the panic payload, the same
/// shape [`std::thread::JoinHandle::join`] uses.
pub struct TaskHandle<R> {
    state: Arc<HandleState<R>>,
}

impl<R> TaskHandle<R> {
    /// Creates a connected handle/completion pair.
    pub(crate) fn new() -> (TaskHandle<R>, TaskCompletion<R>) {
        let state = Arc::new(HandleState {
            outcome: Mutex::new(None),
            finished: Condvar::new(),
        });
        let handle = TaskHandle {
            state: Arc::clone(&state),
        };
        (handle, TaskCompletion { state })
    }

    /// Returns true if the task has finished (normally or by panicking).
    pub fn is_finished(&self) -> bool {
        self.state.outcome.lock().unwrap().is_some()
    }

    /// Blocks until the task finishes and returns its outcome.
    ///
    /// Loops on the condition variable, so spurious wakeups simply re-check
    /// for the outcome.
    pub fn join(self) -> thread::Result<R> {
        let mut outcome = self.state.outcome.lock().unwrap();
        loop {
            if let Some(result) = outcome.take() {
                return result;
            }
            outcome = self.state.finished.wait(outcome).unwrap();
        }
    }
}

/// The write side of a [`TaskHandle`], captured by the submitted task.
pub(crate) struct TaskCompletion<R> {
    state: Arc<HandleState<R>>,
}

impl<R> TaskCompletion<R> {
    /// Publishes the task's outcome and wakes the joining thread.
    pub(crate) fn complete(self, result: thread::Result<R>) {
        let mut outcome = self.state.outcome.lock().unwrap();
        *outcome = Some(result);
        self.state.finished.notify_all();
    }
}

// -----------------------------------------------------------------------------
// Tests
