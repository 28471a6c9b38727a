//! A fixed-capacity circular blocking queue for producer/consumer pipelines.

use std::sync::Condvar;
use std::sync::Mutex;

use tracing::trace;

// -----------------------------------------------------------------------------
// Bounded buffer

/// A bounded buffer: a circular queue of fixed capacity with blocking
/// insertion and removal.
///
/// Producers block in [`put`] while the buffer is full; consumers block in
/// [`get`] while it is empty. Both sides share a single mutex and condition
/// variable, and both re-check their predicate in a loop, so producer and
/// consumer waits interleave correctly and spurious wakeups (or one
/// notification reaching several waiters) are harmless.
///
/// Elements are moved in on `put` and moved out on `get`; ownership transfers
/// with the element, so a producer cannot keep mutating something it already
/// handed over.
///
/// Items inserted by a single producer come back out in insertion order.
/// Nothing is guaranteed about the relative order of items from different
/// producers.
///
/// [`put`]: BoundedBuffer::put
/// [`get`]: BoundedBuffer::get
pub struct BoundedBuffer<E> {
    state: Mutex<State<E>>,
    /// Signaled whenever an element is inserted or removed; both producers
    /// and consumers wait on it.
    changed: Condvar,
    capacity: usize,
}

/// The circular buffer proper. `head` indexes the oldest element, `tail` the
/// next free slot; both wrap modulo the capacity. `len` disambiguates the
/// full and empty cases where the indices coincide.
struct State<E> {
    slots: Box<[Option<E>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<E> BoundedBuffer<E> {
    /// Creates a buffer able to hold `capacity` elements at once.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> BoundedBuffer<E> {
        assert!(capacity >= 1, "a bounded buffer requires nonzero capacity");

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        BoundedBuffer {
            state: Mutex::new(State {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
                len: 0,
            }),
            changed: Condvar::new(),
            capacity,
        }
    }

    /// Places an element into the buffer, blocking while the buffer is full.
    pub fn put(&self, item: E) {
        let mut state = self.state.lock().unwrap();
        while state.len == self.capacity {
            trace!("put(): waiting until buffer not full");
            state = self.changed.wait(state).unwrap();
        }

        let tail = state.tail;
        state.slots[tail] = Some(item);
        state.tail = (tail + 1) % self.capacity;
        state.len += 1;
        trace!(
            "put(): buffer now has {} element(s), range ({}, {})",
            state.len, state.head, state.tail
        );
        drop(state);

        // Wake all waiters; whoever finds its predicate still false goes
        // back to sleep.
        self.changed.notify_all();
    }

    /// Places each element into the buffer in turn, via [`BoundedBuffer::put`].
    ///
    /// This is a convenience, not a transaction: other producers' elements
    /// can interleave anywhere within the batch.
    pub fn put_all<I>(&self, items: I)
    where
        I: IntoIterator<Item = E>,
    {
        for item in items {
            self.put(item);
        }
    }

    /// Removes and returns the oldest element, blocking while the buffer is
    /// empty.
    pub fn get(&self) -> E {
        let mut state = self.state.lock().unwrap();
        while state.len == 0 {
            trace!("get(): waiting until buffer not empty");
            state = self.changed.wait(state).unwrap();
        }

        let head = state.head;
        let item = state.slots[head]
            .take()
            .expect("occupied slot within the live range");
        state.head = (head + 1) % self.capacity;
        state.len -= 1;
        trace!(
            "get(): buffer now has {} element(s), range ({}, {})",
            state.len, state.head, state.tail
        );
        drop(state);

        self.changed.notify_all();
        item
    }

    /// Returns the number of elements currently stored. A snapshot; other
    /// threads may change it immediately.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len
    }

    /// Returns true when the buffer currently holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fixed capacity the buffer was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// -----------------------------------------------------------------------------
// Tests
