use core::cmp::Ordering;

/// The ordering capability of a [`CdfTree`](crate::CdfTree).
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator, so a custom order can
/// be supplied inline:
///
/// ```
/// use cdf_tree::{CdfTree, Uniform};
///
/// let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
/// let mut tree = CdfTree::with_comparator(by_len, Uniform);
/// tree.insert("ccc", ()).unwrap();
/// tree.insert("a", ()).unwrap();
/// tree.insert("bb", ()).unwrap();
///
/// let keys: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
/// assert_eq!(keys, ["a", "bb", "ccc"]);
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares two keys. Must be a total order and must not change while the
    /// keys are in a tree.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Natural;

impl<K: ?Sized + Ord> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
