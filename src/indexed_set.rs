//! An indexed set with selectable ordering, and no synchronization of its
//! own. The guarded wrappers in [`crate::guarded`] make it shareable.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::hash::Hash;

// -----------------------------------------------------------------------------
// Indexed set

/// A set that additionally allows access by position in iteration order, and
/// supports sorted or unsorted storage.
///
/// The index-based access is a weak convenience: for an unsorted set the
/// iteration order is arbitrary, and for either backing the element found at
/// a given index changes as elements are added. Callers that need a stable
/// view should take a copy instead.
///
/// This type performs no locking. Share it between threads through
/// [`SynchronizedSet`] or [`ConcurrentSet`].
///
/// [`SynchronizedSet`]: crate::SynchronizedSet
/// [`ConcurrentSet`]: crate::ConcurrentSet
#[derive(Debug)]
pub struct IndexedSet<E> {
    backing: Backing<E>,
}

#[derive(Debug)]
enum Backing<E> {
    Unsorted(HashSet<E>),
    Sorted(BTreeSet<E>),
}

impl<E> IndexedSet<E>
where
    E: Ord + Hash + Clone,
{
    /// Creates an empty set with arbitrary iteration order.
    pub fn new() -> IndexedSet<E> {
        IndexedSet {
            backing: Backing::Unsorted(HashSet::new()),
        }
    }

    /// Creates an empty set that iterates in ascending order.
    pub fn sorted() -> IndexedSet<E> {
        IndexedSet {
            backing: Backing::Sorted(BTreeSet::new()),
        }
    }

    /// Adds an element. Returns true if it was inserted, false if it was
    /// already present.
    pub fn add(&mut self, element: E) -> bool {
        match &mut self.backing {
            Backing::Unsorted(set) => set.insert(element),
            Backing::Sorted(set) => set.insert(element),
        }
    }

    /// Adds every element in turn. Returns true if any of them was newly
    /// inserted.
    pub fn add_all<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = E>,
    {
        let mut added = false;
        for element in elements {
            added |= self.add(element);
        }
        added
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match &self.backing {
            Backing::Unsorted(set) => set.len(),
            Backing::Sorted(set) => set.len(),
        }
    }

    /// Returns true if the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the element is present.
    pub fn contains(&self, element: &E) -> bool {
        match &self.backing {
            Backing::Unsorted(set) => set.contains(element),
            Backing::Sorted(set) => set.contains(element),
        }
    }

    /// Returns the element at `index` in iteration order, or `None` if the
    /// index is out of range.
    pub fn get(&self, index: usize) -> Option<&E> {
        self.iter().nth(index)
    }

    /// Returns a copy of the set with arbitrary iteration order.
    pub fn unsorted_copy(&self) -> HashSet<E> {
        self.iter().cloned().collect()
    }

    /// Returns a copy of the set in ascending order.
    pub fn sorted_copy(&self) -> BTreeSet<E> {
        self.iter().cloned().collect()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &E> + '_> {
        match &self.backing {
            Backing::Unsorted(set) => Box::new(set.iter()),
            Backing::Sorted(set) => Box::new(set.iter()),
        }
    }
}

impl<E> Default for IndexedSet<E>
where
    E: Ord + Hash + Clone,
{
    fn default() -> IndexedSet<E> {
        IndexedSet::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: [&str; 4] = ["ant", "fox", "fly", "bee"];

    #[test]
    fn sorted_set_iterates_in_order() {
        let mut set = IndexedSet::sorted();
        set.add_all(WORDS);

        assert_eq!(set.len(), 4);
        assert_eq!(set.get(0), Some(&"ant"));
        assert_eq!(set.get(3), Some(&"fox"));
    }

    #[test]
    fn unsorted_set_holds_the_same_elements() {
        let mut set = IndexedSet::new();
        set.add_all(WORDS);

        assert_eq!(set.len(), 4);
        for word in WORDS {
            assert!(set.contains(&word));
        }
        assert!(!set.contains(&"cow"));
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut set = IndexedSet::new();
        assert!(set.add("ant"));
        assert!(!set.add("ant"));
        assert!(!set.add_all(["ant", "ant"]));
        assert!(set.add_all(["ant", "bee"]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn out_of_range_index_returns_none() {
        let mut set = IndexedSet::sorted();
        set.add("ant");
        assert_eq!(set.get(1), None);
        assert_eq!(IndexedSet::<&str>::new().get(0), None);
    }

    #[test]
    fn copies_reorder_the_elements() {
        let mut unsorted = IndexedSet::new();
        unsorted.add_all(WORDS);

        let sorted_copy = unsorted.sorted_copy();
        let in_order: Vec<&str> = sorted_copy.into_iter().collect();
        assert_eq!(in_order, ["ant", "bee", "fly", "fox"]);

        let unsorted_copy = unsorted.unsorted_copy();
        assert_eq!(unsorted_copy.len(), 4);
    }
}
