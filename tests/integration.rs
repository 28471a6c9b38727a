//! Cross-module tests: recursive fork-join work on the pool, a
//! producer/consumer pipeline over the bounded buffer, and the guarded sets
//! under contention.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use drover::BoundedBuffer;
use drover::PendingTracker;
use drover::WorkQueue;
use tempfile::TempDir;

// -----------------------------------------------------------------------------
// Directory tree fixtures

/// Totals accumulated by a directory walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Totals {
    files: u64,
    bytes: u64,
}

/// Creates `branching` subdirectories per level down to `depth`, each level
/// holding `files_per_dir` small files of distinct sizes.
fn build_tree(root: &Path, depth: usize, branching: usize, files_per_dir: usize) {
    for index in 0..files_per_dir {
        let path = root.join(format!("file-{index}.dat"));
        let mut file = File::create(path).unwrap();
        file.write_all(&vec![b'x'; 10 + index]).unwrap();
    }

    if depth == 0 {
        return;
    }

    for index in 0..branching {
        let subdir = root.join(format!("dir-{index}"));
        fs::create_dir(&subdir).unwrap();
        build_tree(&subdir, depth - 1, branching, files_per_dir);
    }
}

/// Single-threaded reference walk.
fn sequential_walk(root: &Path) -> Totals {
    let mut totals = Totals::default();
    for entry in fs::read_dir(root).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            let sub = sequential_walk(&path);
            totals.files += sub.files;
            totals.bytes += sub.bytes;
        } else {
            totals.files += 1;
            totals.bytes += entry.metadata().unwrap().len();
        }
    }
    totals
}

// -----------------------------------------------------------------------------
// Fork-join directory walker

/// Queues one task per directory, fanning out recursively on the fixed pool.
/// Each task accumulates into locals and merges into the shared totals once,
/// so the totals lock is taken O(directories) times rather than O(entries).
fn spawn_walk(
    queue: &Arc<WorkQueue>,
    tracker: &PendingTracker,
    totals: &Arc<Mutex<Totals>>,
    directory: PathBuf,
) {
    // Register before queueing, so the tracked count cannot dip to zero
    // while this task sits queued but unstarted.
    let guard = tracker.guard();

    let task_queue = Arc::clone(queue);
    let task_tracker = tracker.clone();
    let task_totals = Arc::clone(totals);
    queue.execute(move || {
        let _guard = guard;
        let mut files = 0u64;
        let mut bytes = 0u64;

        if let Ok(entries) = fs::read_dir(&directory) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    spawn_walk(&task_queue, &task_tracker, &task_totals, path);
                } else if let Ok(metadata) = entry.metadata() {
                    files += 1;
                    bytes += metadata.len();
                }
            }
        }

        let mut shared = task_totals.lock().unwrap();
        shared.files += files;
        shared.bytes += bytes;
    });
}

fn parallel_walk(root: &Path, threads: usize) -> Totals {
    let queue = Arc::new(WorkQueue::new(threads));
    let tracker = PendingTracker::new();
    let totals = Arc::new(Mutex::new(Totals::default()));

    spawn_walk(&queue, &tracker, &totals, root.to_path_buf());
    tracker.wait();
    queue.shutdown();

    // A worker may still hold its clone of the totals Arc for an instant
    // after the guard's decrement, so read through the lock rather than
    // unwrapping the Arc.
    totals.lock().unwrap().clone()
}

#[test]
fn parallel_walk_matches_sequential_walk() {
    let root = TempDir::new().unwrap();
    build_tree(root.path(), 3, 3, 4);

    let expected = sequential_walk(root.path());
    assert!(expected.files > 0);

    for threads in [1, 2, 8] {
        let actual = parallel_walk(root.path(), threads);
        assert_eq!(actual, expected, "mismatch with {threads} worker(s)");
    }
}

#[test]
fn wide_tree_on_a_small_pool() {
    // Roughly the shape from the original demos: ten directories, fifty
    // files, four workers. The interesting property is that wait() returns
    // at all with more directories in flight than workers.
    let root = TempDir::new().unwrap();
    for dir in 0..10 {
        let subdir = root.path().join(format!("dir-{dir}"));
        fs::create_dir(&subdir).unwrap();
        for index in 0..5 {
            let mut file = File::create(subdir.join(format!("file-{index}"))).unwrap();
            file.write_all(&vec![b'y'; 100 + index]).unwrap();
        }
    }

    let expected = sequential_walk(root.path());
    assert_eq!(expected.files, 50);

    let actual = parallel_walk(root.path(), 4);
    assert_eq!(actual, expected);
}

#[test]
fn tracker_survives_a_missing_directory() {
    let root = TempDir::new().unwrap();
    build_tree(root.path(), 1, 2, 1);

    // Walking a path that cannot be read must not strand the pending count;
    // the task merges empty totals and releases its slot.
    let queue = Arc::new(WorkQueue::new(2));
    let tracker = PendingTracker::new();
    let totals = Arc::new(Mutex::new(Totals::default()));

    spawn_walk(
        &queue,
        &tracker,
        &totals,
        root.path().join("does-not-exist"),
    );
    tracker.wait();

    assert_eq!(*totals.lock().unwrap(), Totals::default());
}

// -----------------------------------------------------------------------------
// Producer/consumer pipeline

#[test]
fn pipeline_moves_every_item_exactly_once() {
    let buffer: Arc<BoundedBuffer<u32>> = Arc::new(BoundedBuffer::new(8));
    let producers = 3u32;
    let per_producer = 200u32;
    let total = producers * per_producer;

    let producer_handles: Vec<_> = (0..producers)
        .map(|producer| {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                let start = producer * per_producer;
                buffer.put_all(start..start + per_producer);
            })
        })
        .collect();

    // Two consumers split the fixed item count between them.
    let consumed = Arc::new(Mutex::new(Vec::new()));
    let consumer_handles: Vec<_> = [total / 2, total - total / 2]
        .into_iter()
        .map(|count| {
            let buffer = Arc::clone(&buffer);
            let consumed = Arc::clone(&consumed);
            std::thread::spawn(move || {
                for _ in 0..count {
                    let item = buffer.get();
                    consumed.lock().unwrap().push(item);
                }
            })
        })
        .collect();

    for handle in producer_handles {
        handle.join().unwrap();
    }
    for handle in consumer_handles {
        handle.join().unwrap();
    }

    let mut received = Arc::try_unwrap(consumed).unwrap().into_inner().unwrap();
    received.sort_unstable();
    let expected: Vec<u32> = (0..total).collect();
    assert_eq!(received, expected);
    assert!(buffer.is_empty());
}

// -----------------------------------------------------------------------------
// Pool reuse across fork-join rounds

#[test]
fn one_pool_serves_consecutive_operations() {
    let root = TempDir::new().unwrap();
    build_tree(root.path(), 2, 2, 3);
    let expected = sequential_walk(root.path());

    let queue = Arc::new(WorkQueue::new(4));

    // Each round gets its own tracker; sharing one across unrelated roots
    // would let their completion signals bleed into each other.
    for _ in 0..3 {
        let tracker = PendingTracker::new();
        let totals = Arc::new(Mutex::new(Totals::default()));
        spawn_walk(&queue, &tracker, &totals, root.path().to_path_buf());
        tracker.wait();
        assert_eq!(*totals.lock().unwrap(), expected);
    }

    queue.shutdown();
}
