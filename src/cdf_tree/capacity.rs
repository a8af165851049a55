use super::CdfTree;
use crate::compare::Natural;
use crate::raw::RawCdfTree;

impl<K, V, W> CdfTree<K, V, W, Natural> {
    /// Creates an empty tree with capacity for at least `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let tree: CdfTree<i32, ()> = CdfTree::with_capacity(32, Uniform);
    /// assert!(tree.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize, weigher: W) -> Self {
        CdfTree {
            raw: RawCdfTree::with_capacity(capacity, Natural, weigher),
        }
    }
}

impl<K, V, W, C> CdfTree<K, V, W, C> {
    /// Returns the number of entries the tree can hold without reallocating.
    ///
    /// Removed entries leave their slot behind for reuse, so the capacity never
    /// shrinks.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let tree: CdfTree<i32, ()> = CdfTree::with_capacity(32, Uniform);
    /// assert!(tree.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
