//! Two lock strategies over the same indexed-set contract.
//!
//! [`SynchronizedSet`] takes one exclusive lock around every operation, reads
//! included; simple, but readers serialize against each other.
//! [`ConcurrentSet`] uses a reader/writer lock instead: mutation takes the
//! write lock, everything else takes the read lock, so read-only operations
//! proceed concurrently. Both apply their strategy uniformly to every public
//! operation for the lifetime of the instance; the backing [`IndexedSet`] is
//! never touched without the appropriate lock held.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Mutex;
use std::sync::RwLock;

use crate::indexed_set::IndexedSet;

// -----------------------------------------------------------------------------
// Guarded contract

/// The thread-safe indexed-set contract shared by both lock strategies.
///
/// [`get`] returns a clone rather than a reference, since a borrow cannot
/// outlive the lock guard. As with [`IndexedSet::get`], the element found at
/// a given index is not stable across concurrent insertions; that is a
/// documented weak guarantee of index-into-iteration-order access, not a
/// defect of either strategy.
///
/// [`get`]: GuardedSet::get
pub trait GuardedSet<E>
where
    E: Ord + Hash + Clone,
{
    /// Adds an element. Returns true if it was inserted, false if it was
    /// already present.
    fn add(&self, element: E) -> bool;

    /// Adds every element under a single lock acquisition. Returns true if
    /// any of them was newly inserted.
    fn add_all<I>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = E>;

    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns true if the set holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the element is present.
    fn contains(&self, element: &E) -> bool;

    /// Returns a clone of the element at `index` in iteration order, or
    /// `None` if the index is out of range.
    fn get(&self, index: usize) -> Option<E>;

    /// Returns a copy of the set with arbitrary iteration order.
    fn unsorted_copy(&self) -> HashSet<E>;

    /// Returns a copy of the set in ascending order.
    fn sorted_copy(&self) -> BTreeSet<E>;
}

// -----------------------------------------------------------------------------
// Exclusive-lock strategy

/// An [`IndexedSet`] guarded by a single exclusive lock.
///
/// Every operation, including read-only ones, acquires the same mutex for
/// its full duration.
pub struct SynchronizedSet<E> {
    set: Mutex<IndexedSet<E>>,
}

impl<E> SynchronizedSet<E>
where
    E: Ord + Hash + Clone,
{
    /// Creates an empty guarded set with arbitrary iteration order.
    pub fn new() -> SynchronizedSet<E> {
        SynchronizedSet {
            set: Mutex::new(IndexedSet::new()),
        }
    }

    /// Creates an empty guarded set that iterates in ascending order.
    pub fn sorted() -> SynchronizedSet<E> {
        SynchronizedSet {
            set: Mutex::new(IndexedSet::sorted()),
        }
    }
}

impl<E> Default for SynchronizedSet<E>
where
    E: Ord + Hash + Clone,
{
    fn default() -> SynchronizedSet<E> {
        SynchronizedSet::new()
    }
}

impl<E> GuardedSet<E> for SynchronizedSet<E>
where
    E: Ord + Hash + Clone,
{
    fn add(&self, element: E) -> bool {
        self.set.lock().unwrap().add(element)
    }

    fn add_all<I>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = E>,
    {
        self.set.lock().unwrap().add_all(elements)
    }

    fn len(&self) -> usize {
        self.set.lock().unwrap().len()
    }

    fn contains(&self, element: &E) -> bool {
        self.set.lock().unwrap().contains(element)
    }

    fn get(&self, index: usize) -> Option<E> {
        self.set.lock().unwrap().get(index).cloned()
    }

    fn unsorted_copy(&self) -> HashSet<E> {
        self.set.lock().unwrap().unsorted_copy()
    }

    fn sorted_copy(&self) -> BTreeSet<E> {
        self.set.lock().unwrap().sorted_copy()
    }
}

// -----------------------------------------------------------------------------
// Reader/writer strategy

/// An [`IndexedSet`] guarded by a reader/writer lock.
///
/// `add` and `add_all` take the write lock; every other operation takes the
/// read lock, so any number of readers proceed concurrently.
pub struct ConcurrentSet<E> {
    set: RwLock<IndexedSet<E>>,
}

impl<E> ConcurrentSet<E>
where
    E: Ord + Hash + Clone,
{
    /// Creates an empty guarded set with arbitrary iteration order.
    pub fn new() -> ConcurrentSet<E> {
        ConcurrentSet {
            set: RwLock::new(IndexedSet::new()),
        }
    }

    /// Creates an empty guarded set that iterates in ascending order.
    pub fn sorted() -> ConcurrentSet<E> {
        ConcurrentSet {
            set: RwLock::new(IndexedSet::sorted()),
        }
    }
}

impl<E> Default for ConcurrentSet<E>
where
    E: Ord + Hash + Clone,
{
    fn default() -> ConcurrentSet<E> {
        ConcurrentSet::new()
    }
}

impl<E> GuardedSet<E> for ConcurrentSet<E>
where
    E: Ord + Hash + Clone,
{
    fn add(&self, element: E) -> bool {
        self.set.write().unwrap().add(element)
    }

    fn add_all<I>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = E>,
    {
        self.set.write().unwrap().add_all(elements)
    }

    fn len(&self) -> usize {
        self.set.read().unwrap().len()
    }

    fn contains(&self, element: &E) -> bool {
        self.set.read().unwrap().contains(element)
    }

    fn get(&self, index: usize) -> Option<E> {
        self.set.read().unwrap().get(index).cloned()
    }

    fn unsorted_copy(&self) -> HashSet<E> {
        self.set.read().unwrap().unsorted_copy()
    }

    fn sorted_copy(&self) -> BTreeSet<E> {
        self.set.read().unwrap().sorted_copy()
    }
}

// -----------------------------------------------------------------------------
// Tests
