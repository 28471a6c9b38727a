//! A small concurrency runtime built on classic blocking primitives.
//!
//! Drover provides four pieces that fit together into a fork-join style of
//! parallelism without per-task thread creation:
//!
//! - [`WorkQueue`]: a fixed pool of worker threads draining a shared FIFO of
//!   submitted tasks. Tasks may themselves submit further tasks, so
//!   unboundedly-recursive computations (walking a directory tree, say) run
//!   entirely on the fixed pool.
//! - [`PendingTracker`]: a pending-work counter that lets a submitter block
//!   until every task it (transitively) spawned has finished. This replaces
//!   per-thread joins, which are unavailable because pool threads never
//!   terminate between tasks.
//! - [`BoundedBuffer`]: a fixed-capacity circular blocking queue for
//!   producer/consumer pipelines, independent of the pool.
//! - [`SynchronizedSet`] and [`ConcurrentSet`]: the same indexed-set contract
//!   guarded by an exclusive lock or a reader/writer lock, for comparing the
//!   two strategies under concurrent load.
//!
//! Everything blocks on an explicit mutex + condition-variable pair and
//! re-checks its predicate in a loop, so spurious wakeups are harmless. None
//! of the components are global; construct them, share them with [`Arc`] if
//! needed, and drop them when done. Dropping a [`WorkQueue`] shuts it down
//! and joins its workers.
//!
//! [`Arc`]: std::sync::Arc

// -----------------------------------------------------------------------------
// Modules

mod buffer;
mod guarded;
mod indexed_set;
mod pending;
mod task;
mod unwind;
mod work_queue;

// -----------------------------------------------------------------------------
// Top-level exports

pub use buffer::BoundedBuffer;
pub use guarded::ConcurrentSet;
pub use guarded::GuardedSet;
pub use guarded::SynchronizedSet;
pub use indexed_set::IndexedSet;
pub use pending::PendingGuard;
pub use pending::PendingTracker;
pub use task::Task;
pub use task::TaskHandle;
pub use work_queue::DEFAULT_THREADS;
pub use work_queue::WorkQueue;
