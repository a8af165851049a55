use super::handle::Handle;
use super::node::Color;
use super::raw_cdf_tree::RawCdfTree;

impl<K, V, W, C> RawCdfTree<K, V, W, C> {
    /// Unlinks the live node `target` and returns its key and value.
    ///
    /// A node with two children is replaced by its in-order successor, which is
    /// relinked into `target`'s position rather than having its entry moved, so
    /// handles to the successor stay valid.
    pub(crate) fn remove(&mut self, target: Handle) -> (K, V) {
        let spliced = if self.left(target) == Handle::NIL || self.right(target) == Handle::NIL {
            target
        } else {
            self.successor(target)
        };
        let child = if self.left(spliced) == Handle::NIL {
            self.right(spliced)
        } else {
            self.left(spliced)
        };

        // Take `spliced` out of every aggregate above it before it leaves the tree.
        let spliced_weight = self.own_weight(spliced);
        self.add_to_ancestors(spliced, -spliced_weight);

        // Splice. `child` may be nil, whose parent then records where the gap is.
        let parent = self.parent(spliced);
        self.set_parent(child, parent);
        if spliced == self.left(parent) {
            self.set_left(parent, child);
        } else {
            self.set_right(parent, child);
        }

        if self.color(spliced) == Color::Black {
            self.remove_fixup(child);
        }

        if spliced != target {
            // `spliced` takes over `target`'s position, color and children.
            let target_weight = self.own_weight(target);
            let link = self.link(target);
            let (left, right, parent, color) = (link.left, link.right, link.parent, link.color);

            self.set_left(spliced, left);
            self.set_right(spliced, right);
            self.set_parent(spliced, parent);
            self.set_color(spliced, color);
            self.set_parent(left, spliced);
            self.set_parent(right, spliced);
            if target == self.left(parent) {
                self.set_left(parent, spliced);
            } else {
                self.set_right(parent, spliced);
            }

            // The ancestors still count `target`'s weight at this position.
            self.update_weight(spliced);
            self.add_to_ancestors(spliced, spliced_weight - target_weight);
        }

        debug_assert!(self.sentinels_intact(), "sentinel corrupted by `remove()`");
        self.take(target).into_entry()
    }

    /// Restores the red-black properties after a black node was spliced out
    /// above `node`, which now carries an extra black.
    fn remove_fixup(&mut self, mut node: Handle) {
        while !self.is_red(node) && node != self.root() {
            let parent = self.parent(node);

            if node == self.left(parent) {
                let mut sibling = self.right(parent);
                if self.is_red(sibling) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right(self.parent(node));
                }
                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = self.parent(node);
                } else {
                    if !self.is_red(self.right(sibling)) {
                        let nephew = self.left(sibling);
                        self.set_color(nephew, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right(self.parent(node));
                    }
                    let parent = self.parent(node);
                    self.set_color(sibling, self.color(parent));
                    self.set_color(parent, Color::Black);
                    let nephew = self.right(sibling);
                    self.set_color(nephew, Color::Black);
                    self.rotate_left(parent);
                    node = self.root();
                }
            } else {
                let mut sibling = self.left(parent);
                if self.is_red(sibling) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left(self.parent(node));
                }
                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = self.parent(node);
                } else {
                    if !self.is_red(self.left(sibling)) {
                        let nephew = self.right(sibling);
                        self.set_color(nephew, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left(self.parent(node));
                    }
                    let parent = self.parent(node);
                    self.set_color(sibling, self.color(parent));
                    self.set_color(parent, Color::Black);
                    let nephew = self.left(sibling);
                    self.set_color(nephew, Color::Black);
                    self.rotate_right(parent);
                    node = self.root();
                }
            }
        }
        self.set_color(node, Color::Black);
    }
}
