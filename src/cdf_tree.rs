use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use crate::compare::{Comparator, Natural};
use crate::raw::{Handle, RawCdfTree};
use crate::weight::{Uniform, Weigher};
use crate::{Error, NodeHandle, Stats};

mod capacity;
mod order_statistic;

/// An ordered multiset of weighted keys, built on a [red-black tree], that
/// answers cumulative-weight queries in O(log n).
///
/// Every key is given a non-negative weight by the tree's [`Weigher`]. Each node
/// keeps the total weight of its subtree, which makes [`rank`](CdfTree::rank)
/// (the total weight of all keys before a node) a walk from the node up to the
/// root. With the [`Uniform`] weigher ranks are plain order statistics; with
/// [`Power`](crate::Power) they form an empirical CDF of `x^p`.
///
/// Insertion hands back a [`NodeHandle`] that stays valid until the node is
/// removed, so callers can delete or rank a node later without searching for it.
/// Duplicate keys are allowed; [`find`](CdfTree::find) returns the topmost one.
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key changes while it is in the tree. The behavior
/// resulting from such a logic error is not specified, but will be encapsulated
/// to the `CdfTree` that observed it and not result in undefined behavior.
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
///
/// # Examples
///
/// ```
/// use cdf_tree::{CdfTree, Uniform};
///
/// let mut tree = CdfTree::new(Uniform);
/// for key in [5, 1, 3, 8, 2] {
///     tree.insert(key, ()).unwrap();
/// }
///
/// // Two keys (1 and 2) precede 3.
/// let three = tree.find(&3).unwrap();
/// assert_eq!(tree.rank(three), Ok(2.0));
///
/// // Removing 1 moves 3 down by one.
/// let one = tree.find(&1).unwrap();
/// tree.remove(one).unwrap();
/// assert_eq!(tree.rank(three), Ok(1.0));
/// ```
pub struct CdfTree<K, V, W = Uniform, C = Natural> {
    raw: RawCdfTree<K, V, W, C>,
}

/// An iterator over the entries of a `CdfTree`, in key order.
///
/// This `struct` is created by the [`iter`] method on [`CdfTree`].
///
/// [`iter`]: CdfTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, W, C> {
    tree: &'a RawCdfTree<K, V, W, C>,
    front: Handle,
    back: Handle,
    remaining: usize,
}

/// An iterator over the handles of a `CdfTree`, in key order.
///
/// This `struct` is created by the [`handles`] method on [`CdfTree`].
///
/// [`handles`]: CdfTree::handles
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Handles<'a, K, V, W, C> {
    inner: Iter<'a, K, V, W, C>,
}

/// An iterator over a closed key range of a `CdfTree`.
///
/// This `struct` is created by the [`range`] method on [`CdfTree`].
///
/// [`range`]: CdfTree::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V, W, C> {
    tree: &'a RawCdfTree<K, V, W, C>,
    // Both ends are inclusive; `nil` for an empty range.
    front: Handle,
    back: Handle,
}

impl<K, V, W> CdfTree<K, V, W, Natural> {
    /// Makes a new, empty `CdfTree` ordered by [`Ord`] and weighted by `weigher`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Power};
    ///
    /// let mut tree = CdfTree::new(Power::new(2.0).unwrap());
    /// tree.insert(4, "four").unwrap();
    /// assert_eq!(tree.total_weight(), 16.0);
    /// ```
    #[must_use]
    pub fn new(weigher: W) -> Self {
        CdfTree {
            raw: RawCdfTree::new(Natural, weigher),
        }
    }
}

impl<K, V, W, C> CdfTree<K, V, W, C> {
    /// Makes a new, empty `CdfTree` with a custom key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::with_comparator(|a: &i32, b: &i32| b.cmp(a), Uniform);
    /// tree.insert(1, ()).unwrap();
    /// let two = tree.insert(2, ()).unwrap();
    ///
    /// // Descending order: nothing precedes 2.
    /// assert_eq!(tree.rank(two), Ok(0.0));
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: C, weigher: W) -> Self {
        CdfTree {
            raw: RawCdfTree::new(comparator, weigher),
        }
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1, "a").unwrap();
    /// tree.insert(1, "b").unwrap();
    /// assert_eq!(tree.len(), 2);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Drops every entry. Handles issued so far become stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Error, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// let handle = tree.insert(1, "a").unwrap();
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.get(handle), Err(Error::StaleHandle(handle)));
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the comparator.
    pub const fn comparator(&self) -> &C {
        &self.raw.comparator
    }

    /// Returns a reference to the weigher.
    pub const fn weigher(&self) -> &W {
        &self.raw.weigher
    }

    /// Returns `true` if `handle` refers to an entry of this tree.
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.raw.resolve(handle).is_ok()
    }

    /// Returns the key and value behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignHandle`] or [`Error::StaleHandle`] if `handle`
    /// does not refer to an entry of this tree.
    pub fn get(&self, handle: NodeHandle) -> Result<(&K, &V), Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.entry(node))
    }

    /// Returns the key behind `handle`.
    ///
    /// # Errors
    ///
    /// See [`get`](CdfTree::get).
    pub fn key(&self, handle: NodeHandle) -> Result<&K, Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.key(node))
    }

    /// Returns the value behind `handle`.
    ///
    /// # Errors
    ///
    /// See [`get`](CdfTree::get).
    pub fn value(&self, handle: NodeHandle) -> Result<&V, Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.value(node))
    }

    /// Returns a mutable reference to the value behind `handle`. Values carry no
    /// ordering, so they can be changed in place.
    ///
    /// # Errors
    ///
    /// See [`get`](CdfTree::get).
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// let handle = tree.insert("k", 1).unwrap();
    /// *tree.value_mut(handle).unwrap() += 1;
    /// assert_eq!(tree.value(handle), Ok(&2));
    /// ```
    pub fn value_mut(&mut self, handle: NodeHandle) -> Result<&mut V, Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.value_mut(node))
    }

    /// Removes the entry behind `handle` and returns its key and value.
    ///
    /// Other handles stay valid; `handle` becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignHandle`] or [`Error::StaleHandle`] if `handle`
    /// does not refer to an entry of this tree. The tree is left untouched.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Error, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// let handle = tree.insert(7, "seven").unwrap();
    /// assert_eq!(tree.remove(handle), Ok((7, "seven")));
    /// assert_eq!(tree.remove(handle), Err(Error::StaleHandle(handle)));
    /// ```
    pub fn remove(&mut self, handle: NodeHandle) -> Result<(K, V), Error> {
        let node = self.raw.resolve(handle)?;
        log::trace!("removing {handle:?}");
        Ok(self.raw.remove(node))
    }

    /// Returns the handle of the first entry in key order, or `None` if the tree
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// assert_eq!(tree.first(), None);
    /// tree.insert(2, ()).unwrap();
    /// let one = tree.insert(1, ()).unwrap();
    /// assert_eq!(tree.first(), Some(one));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<NodeHandle> {
        self.raw.handle_of_opt(self.raw.first())
    }

    /// Returns the handle of the last entry in key order, or `None` if the tree
    /// is empty.
    #[must_use]
    pub fn last(&self) -> Option<NodeHandle> {
        self.raw.handle_of_opt(self.raw.last())
    }

    /// Returns the handle of the entry after `handle` in key order, or `None` if
    /// `handle` is the last one.
    ///
    /// # Errors
    ///
    /// See [`get`](CdfTree::get).
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) over a full traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// let b = tree.insert('b', ()).unwrap();
    /// let a = tree.insert('a', ()).unwrap();
    /// assert_eq!(tree.successor(a), Ok(Some(b)));
    /// assert_eq!(tree.successor(b), Ok(None));
    /// assert_eq!(tree.predecessor(b), Ok(Some(a)));
    /// ```
    pub fn successor(&self, handle: NodeHandle) -> Result<Option<NodeHandle>, Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.handle_of_opt(self.raw.successor(node)))
    }

    /// Returns the handle of the entry before `handle` in key order, or `None` if
    /// `handle` is the first one.
    ///
    /// # Errors
    ///
    /// See [`get`](CdfTree::get).
    pub fn predecessor(&self, handle: NodeHandle) -> Result<Option<NodeHandle>, Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.handle_of_opt(self.raw.predecessor(node)))
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// tree.insert(3, "c").unwrap();
    /// tree.insert(1, "a").unwrap();
    /// tree.insert(2, "b").unwrap();
    ///
    /// let entries: Vec<_> = tree.iter().collect();
    /// assert_eq!(entries, [(&1, &"a"), (&2, &"b"), (&3, &"c")]);
    /// assert_eq!(tree.iter().next_back(), Some((&3, &"c")));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, W, C> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the handles of the tree's entries, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// for key in [30, 10, 20] {
    ///     tree.insert(key, ()).unwrap();
    /// }
    ///
    /// let ranks: Vec<f64> = tree.handles().map(|h| tree.rank(h).unwrap()).collect();
    /// assert_eq!(ranks, [0.0, 1.0, 2.0]);
    /// ```
    pub fn handles(&self) -> Handles<'_, K, V, W, C> {
        Handles { inner: self.iter() }
    }
}

impl<K, V, W: Weigher<K>, C: Comparator<K>> CdfTree<K, V, W, C> {
    /// Inserts an entry and returns its handle.
    ///
    /// Keys equal to an existing key are kept alongside it; the new entry is
    /// placed before its equals in key order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] if the weigher maps `key` to a NaN,
    /// infinite or negative weight. The tree is left untouched and `key` and
    /// `value` are dropped.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Error, Power};
    ///
    /// let mut tree = CdfTree::new(Power::new(0.5).unwrap());
    /// let handle = tree.insert(9, "nine").unwrap();
    /// assert_eq!(tree.get(handle), Ok((&9, &"nine")));
    ///
    /// // sqrt(-9) is not a real weight.
    /// assert!(matches!(tree.insert(-9, "minus nine"), Err(Error::InvalidWeight { .. })));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<NodeHandle, Error> {
        let node = self.raw.insert(key, value)?;
        let handle = self.raw.handle_of(node);
        log::trace!("inserted {handle:?}");
        Ok(handle)
    }

    /// Inserts every entry of `iter`, stopping at the first key with an invalid
    /// weight. Entries before it stay inserted.
    ///
    /// # Errors
    ///
    /// See [`insert`](CdfTree::insert).
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Power};
    ///
    /// let mut tree = CdfTree::new(Power::new(0.5).unwrap());
    /// assert!(tree.try_extend([(1, ()), (-1, ()), (4, ())]).is_err());
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.raw.insert(key, value)?;
        }
        Ok(())
    }

    /// Returns the handle of an entry whose key equals `key`: the topmost one in
    /// the tree if there are several.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// let handle = tree.insert("x", 1).unwrap();
    /// assert_eq!(tree.find(&"x"), Some(handle));
    /// assert_eq!(tree.find(&"y"), None);
    /// ```
    #[must_use]
    pub fn find(&self, key: &K) -> Option<NodeHandle> {
        self.raw.find(key).map(|node| self.raw.handle_of(node))
    }

    /// Gets an iterator over every entry with `low <= key <= high`, sorted by
    /// key. The iterator is empty if `low > high`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// for key in [1, 3, 5, 7, 9] {
    ///     tree.insert(key, key * 10).unwrap();
    /// }
    ///
    /// let inside: Vec<_> = tree.range(&3, &7).map(|(k, _)| *k).collect();
    /// assert_eq!(inside, [3, 5, 7]);
    /// assert_eq!(tree.range(&4, &4).count(), 0);
    /// assert_eq!(tree.range(&9, &1).count(), 0);
    /// ```
    pub fn range(&self, low: &K, high: &K) -> Range<'_, K, V, W, C> {
        let front = self.raw.lower_bound(low);
        let back = match self.raw.upper_bound(high) {
            Handle::NIL => self.raw.last(),
            above => self.raw.predecessor(above),
        };
        // With no key inside the bounds, `front` lands above `high` and `back` below `low`.
        let empty = front == Handle::NIL
            || back == Handle::NIL
            || self.raw.comparator.compare(self.raw.key(front), self.raw.key(back)) == Ordering::Greater;
        if empty {
            Range {
                tree: &self.raw,
                front: Handle::NIL,
                back: Handle::NIL,
            }
        } else {
            Range {
                tree: &self.raw,
                front,
                back,
            }
        }
    }

    /// Checks every invariant of the tree: sentinel state, red-black coloring,
    /// black height, parent links, subtree weights and key order.
    ///
    /// Intended for tests and debugging; it walks the whole tree.
    ///
    /// # Errors
    ///
    /// Returns the first violation found. Any error indicates a bug in this
    /// crate or a comparator or weigher that is not deterministic.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// for key in 0..100 {
    ///     tree.insert(key, ()).unwrap();
    /// }
    /// let stats = tree.validate().unwrap();
    /// assert_eq!(stats.len(), 100);
    /// assert!(stats.max_depth() <= 2 * stats.black_height());
    /// ```
    pub fn validate(&self) -> Result<Stats, Error> {
        self.raw.validate()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, W, C> fmt::Debug for CdfTree<K, V, W, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, W: Default, C: Default> Default for CdfTree<K, V, W, C> {
    /// Creates an empty `CdfTree` with default comparator and weigher.
    fn default() -> CdfTree<K, V, W, C> {
        CdfTree::with_comparator(C::default(), W::default())
    }
}

impl<'a, K, V, W, C> IntoIterator for &'a CdfTree<K, V, W, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, W, C>;

    fn into_iter(self) -> Iter<'a, K, V, W, C> {
        self.iter()
    }
}

impl<'a, K: 'a, V: 'a, W, C> Iterator for Iter<'a, K, V, W, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.next_node().map(|node| self.tree.entry(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<(&'a K, &'a V)> {
        self.next_back()
    }
}

impl<K, V, W, C> Iter<'_, K, V, W, C> {
    fn next_node(&mut self) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = self.tree.successor(node);
        }
        Some(node)
    }

    fn next_node_back(&mut self) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back = self.tree.predecessor(node);
        }
        Some(node)
    }
}

impl<'a, K: 'a, V: 'a, W, C> DoubleEndedIterator for Iter<'a, K, V, W, C> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.next_node_back().map(|node| self.tree.entry(node))
    }
}

impl<K, V, W, C> ExactSizeIterator for Iter<'_, K, V, W, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, W, C> FusedIterator for Iter<'_, K, V, W, C> {}

impl<K, V, W, C> Clone for Iter<'_, K, V, W, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, W, C> fmt::Debug for Iter<'_, K, V, W, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V, W, C> Iterator for Handles<'_, K, V, W, C> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        self.inner.next_node().map(|node| self.inner.tree.handle_of(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, W, C> DoubleEndedIterator for Handles<'_, K, V, W, C> {
    fn next_back(&mut self) -> Option<NodeHandle> {
        self.inner.next_node_back().map(|node| self.inner.tree.handle_of(node))
    }
}

impl<K, V, W, C> ExactSizeIterator for Handles<'_, K, V, W, C> {
    fn len(&self) -> usize {
        self.inner.remaining
    }
}

impl<K, V, W, C> FusedIterator for Handles<'_, K, V, W, C> {}

impl<'a, K: 'a, V: 'a, W, C> Iterator for Range<'a, K, V, W, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.front == Handle::NIL {
            return None;
        }
        let node = self.front;
        if node == self.back {
            self.front = Handle::NIL;
            self.back = Handle::NIL;
        } else {
            self.front = self.tree.successor(node);
        }
        Some(self.tree.entry(node))
    }
}

impl<'a, K: 'a, V: 'a, W, C> DoubleEndedIterator for Range<'a, K, V, W, C> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.back == Handle::NIL {
            return None;
        }
        let node = self.back;
        if node == self.front {
            self.front = Handle::NIL;
            self.back = Handle::NIL;
        } else {
            self.back = self.tree.predecessor(node);
        }
        Some(self.tree.entry(node))
    }
}

impl<K, V, W, C> FusedIterator for Range<'_, K, V, W, C> {}
