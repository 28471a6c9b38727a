//! The work queue: a fixed pool of worker threads draining a shared task
//! queue.
//!
//! Workers are spawned once at construction and then cycle between waiting on
//! the queue's condition variable and running tasks, so submitting a task
//! never creates a thread. Because workers never terminate between tasks they
//! cannot be joined per-task; callers that need to know when a batch of
//! (possibly recursive) work has finished pair the queue with a
//! [`PendingTracker`](crate::PendingTracker).

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread::Builder as ThreadBuilder;
use std::thread::JoinHandle;

use tracing::debug;
use tracing::error;
use tracing::trace;

use crate::task::Task;
use crate::task::TaskHandle;
use crate::unwind;

// -----------------------------------------------------------------------------
// Work queue

/// The number of worker threads used when none is specified.
pub const DEFAULT_THREADS: usize = 5;

/// A fixed pool of worker threads executing queued tasks.
///
/// The pool accepts work through [`WorkQueue::execute`] (fire-and-forget) and
/// [`WorkQueue::submit`] (result-returning) until [`WorkQueue::shutdown`] is
/// called. Tasks may submit further tasks to the same queue from inside their
/// own bodies; this recursive fan-out is the expected way to parallelize
/// tree-shaped computations on the fixed pool.
///
/// A panic inside a task body is caught at the worker loop, logged, and does
/// not terminate the worker or poison the queue.
///
/// # Shutdown
///
/// [`WorkQueue::shutdown`] stops the pool from accepting new work and wakes
/// every idle worker so it can exit. A worker busy running a task finishes
/// that task first. Tasks that were queued but not yet started are
/// **abandoned**, not drained. Dropping the queue shuts it down (if that has
/// not happened already) and joins the worker threads.
pub struct WorkQueue {
    shared: Arc<Shared>,
    /// Join handles for the pool's workers. Fixed at construction.
    workers: Vec<JoinHandle<()>>,
}

/// State shared between the pool handle and its workers.
struct Shared {
    /// Queue of pending tasks, drained front-to-back.
    queue: Mutex<VecDeque<Box<dyn Task>>>,
    /// Signaled when a task is queued or shutdown is requested.
    work_available: Condvar,
    /// Set once by `shutdown` and observed by workers without the queue lock.
    shutdown: AtomicBool,
}

impl WorkQueue {
    /// Creates a work queue with `threads` worker threads, which immediately
    /// begin waiting for tasks.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is zero.
    pub fn new(threads: usize) -> WorkQueue {
        assert!(threads >= 1, "a work queue requires at least one worker");

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            work_available: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            debug!("spawning worker with index {}", index);
            let worker_shared = Arc::clone(&shared);
            let handle = ThreadBuilder::new()
                .name(format!("worker {index}"))
                .spawn(move || worker_loop(&worker_shared))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }

        WorkQueue { shared, workers }
    }

    /// Adds a task to the queue. A worker will pick it up when one is
    /// available.
    ///
    /// Safe to call from any thread, including from inside a task already
    /// running on this queue.
    ///
    /// # Panics
    ///
    /// Panics if called after [`WorkQueue::shutdown`]; submitting work to a
    /// stopped pool is a usage error, and the task would otherwise be
    /// silently discarded.
    pub fn execute<T: Task>(&self, task: T) {
        if self.shared.shutdown.load(Ordering::Acquire) {
            panic!("attempt to execute a task on a work queue after shutdown");
        }

        let mut queue = self.shared.queue.lock().unwrap();
        queue.push_back(Box::new(task));
        trace!("task queued, {} now pending", queue.len());
        drop(queue);

        self.shared.work_available.notify_one();
    }

    /// Adds a result-returning task to the queue and returns a handle that
    /// can be joined for the outcome.
    ///
    /// The handle completes even if `f` panics; the panic payload is returned
    /// from [`TaskHandle::join`] instead of being logged at the worker loop.
    ///
    /// # Panics
    ///
    /// Panics if called after [`WorkQueue::shutdown`].
    pub fn submit<F, R>(&self, f: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (handle, completion) = TaskHandle::new();
        self.execute(move || {
            let outcome = unwind::halt_unwinding(f);
            completion.complete(outcome);
        });
        handle
    }

    /// Stops the pool from accepting new work and wakes every worker.
    ///
    /// Idle workers exit immediately; a worker busy with a task finishes it
    /// first. Tasks queued but not yet started are dropped without running.
    /// Idempotent, and does not block waiting for workers to exit; the
    /// workers are joined when the queue is dropped.
    pub fn shutdown(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        let abandoned = {
            let mut queue = self.shared.queue.lock().unwrap();
            let abandoned = queue.len();
            queue.clear();
            abandoned
        };
        if abandoned > 0 {
            debug!("shutdown abandoning {} queued task(s)", abandoned);
        }

        self.shared.work_available.notify_all();
    }

    /// Returns the number of worker threads, fixed at construction.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Default for WorkQueue {
    /// Creates a work queue with [`DEFAULT_THREADS`] workers.
    fn default() -> WorkQueue {
        WorkQueue::new(DEFAULT_THREADS)
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();

        // A task could be holding the last handle to its own pool, in which
        // case this drop runs on a worker thread and that worker must not
        // join itself.
        let own_thread = std::thread::current().id();
        for handle in self.workers.drain(..) {
            if handle.thread().id() != own_thread {
                let _ = handle.join();
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Worker loop

/// The main loop for a worker thread: wait until a task is queued or shutdown
/// is signaled, run the task, repeat. The shutdown flag is checked before the
/// queue, so a shutdown observed after a wakeup exits the loop even when
/// tasks remain queued.
fn worker_loop(shared: &Shared) {
    trace!("worker started");

    loop {
        let task = {
            let mut queue = shared.queue.lock().unwrap();
            loop {
                if shared.shutdown.load(Ordering::Acquire) {
                    trace!("worker observed shutdown, exiting");
                    return;
                }
                if let Some(task) = queue.pop_front() {
                    break task;
                }
                queue = shared.work_available.wait(queue).unwrap();
            }
        };

        // The queue lock is released while the task runs, so other workers
        // and submitters are free to touch the queue.
        if let Err(payload) = unwind::halt_unwinding(|| task.run()) {
            error!(
                "task panicked while running: {}",
                unwind::payload_message(payload.as_ref())
            );
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
