use super::CdfTree;
use crate::compare::Comparator;
use crate::{Error, NodeHandle};

impl<K, V, W, C> CdfTree<K, V, W, C> {
    /// Returns the total weight of every entry that precedes `handle` in key
    /// order.
    ///
    /// For distinct keys this is the sum of the weights of all keys strictly
    /// less than the handle's key. Among equal keys, the ones placed before
    /// `handle` are counted too; use [`rank_of_key`](CdfTree::rank_of_key) to
    /// exclude every equal key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignHandle`] or [`Error::StaleHandle`] if `handle`
    /// does not refer to an entry of this tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Power};
    ///
    /// let mut tree = CdfTree::new(Power::new(2.0).unwrap());
    /// let one = tree.insert(1, ()).unwrap();
    /// tree.insert(2, ()).unwrap();
    /// let three = tree.insert(3, ()).unwrap();
    ///
    /// assert_eq!(tree.rank(one), Ok(0.0));
    /// assert_eq!(tree.rank(three), Ok(1.0 + 4.0));
    /// ```
    pub fn rank(&self, handle: NodeHandle) -> Result<f64, Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.rank(node))
    }

    /// Returns [`rank`](CdfTree::rank) divided by [`total_weight`](CdfTree::total_weight):
    /// the fraction of the total weight found before `handle`. Returns 0.0 if
    /// every entry weighs nothing.
    ///
    /// # Errors
    ///
    /// See [`rank`](CdfTree::rank).
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_tree::{CdfTree, Uniform};
    ///
    /// let mut tree = CdfTree::new(Uniform);
    /// let handles: Vec<_> = (0..4).map(|k| tree.insert(k, ()).unwrap()).collect();
    /// assert_eq!(tree.cdf(handles[2]), Ok(0.5));
    /// ```
    pub fn cdf(&self, handle: NodeHandle) -> Result<f64, Error> {
        let rank = self.rank(handle)?;
        let total = self.total_weight();
        Ok(if total > 0.0 { rank / total } else { 0.0 })
    }

    /// Returns the sum of all weights in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.raw.total_weight()
    }

    /// Returns the weight of the entry behind `handle` alone.
    ///
    /// # Errors
    ///
    /// See [`rank`](CdfTree::rank).
    pub fn own_weight(&self, handle: NodeHandle) -> Result<f64, Error> {
        let node = self.raw.resolve(handle)?;
        Ok(self.raw.own_weight(node))
    }
}

impl<K, V, W, C: Comparator<K>> CdfTree<K, V, W, C> {
    /// Returns the total weight of every entry whose key is strictly less than
    /// `key`. The key does not need to be present.
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
    /// for key in [1, 2, 2, 2, 3] {
    ///     tree.insert(key, ()).unwrap();
    /// }
    ///
    /// assert_eq!(tree.rank_of_key(&2), 1.0);
    /// assert_eq!(tree.rank_of_key(&3), 4.0);
    /// assert_eq!(tree.rank_of_key(&10), 5.0);
    /// ```
    #[must_use]
    pub fn rank_of_key(&self, key: &K) -> f64 {
        self.raw.rank_of_key(key)
    }
}
