use super::handle::Handle;
use super::raw_cdf_tree::RawCdfTree;

impl<K, V, W, C> RawCdfTree<K, V, W, C> {
    /// Rotates `pivot` down to the left; its right child takes its place.
    ///
    /// ```text
    ///       p                 y
    ///      / \               / \
    ///     a   y     =>      p   c
    ///        / \           / \
    ///       b   c         a   b
    /// ```
    ///
    /// Only `p` and `y` change subtrees, so only their aggregates are recomputed,
    /// `p` first since `y` now sums over it.
    pub(crate) fn rotate_left(&mut self, pivot: Handle) {
        let promoted = self.right(pivot);
        debug_assert!(promoted != Handle::NIL, "`rotate_left()` needs a right child");

        let moved = self.left(promoted);
        self.set_right(pivot, moved);
        // Leave nil's parent alone: the delete fixup may be climbing from it.
        if moved != Handle::NIL {
            self.set_parent(moved, pivot);
        }

        let parent = self.parent(pivot);
        self.set_parent(promoted, parent);
        // The header holds the root on its left.
        if pivot == self.left(parent) {
            self.set_left(parent, promoted);
        } else {
            self.set_right(parent, promoted);
        }

        self.set_left(promoted, pivot);
        self.set_parent(pivot, promoted);

        self.update_weight(pivot);
        self.update_weight(promoted);
    }

    /// Rotates `pivot` down to the right; its left child takes its place.
    ///
    /// ```text
    ///         p             x
    ///        / \           / \
    ///       x   c   =>    a   p
    ///      / \               / \
    ///     a   b             b   c
    /// ```
    pub(crate) fn rotate_right(&mut self, pivot: Handle) {
        let promoted = self.left(pivot);
        debug_assert!(promoted != Handle::NIL, "`rotate_right()` needs a left child");

        let moved = self.right(promoted);
        self.set_left(pivot, moved);
        if moved != Handle::NIL {
            self.set_parent(moved, pivot);
        }

        let parent = self.parent(pivot);
        self.set_parent(promoted, parent);
        if pivot == self.left(parent) {
            self.set_left(parent, promoted);
        } else {
            self.set_right(parent, promoted);
        }

        self.set_right(promoted, pivot);
        self.set_parent(pivot, promoted);

        self.update_weight(pivot);
        self.update_weight(promoted);
    }
}
