use core::cmp::Ordering;

use super::handle::Handle;
use super::node::{Color, Node};
use super::raw_cdf_tree::RawCdfTree;
use crate::Error;
use crate::compare::Comparator;
use crate::weight::{Weigher, is_valid_weight};

impl<K, V, W: Weigher<K>, C: Comparator<K>> RawCdfTree<K, V, W, C> {
    /// Inserts a node for `key` and returns its slot.
    ///
    /// Equal keys are placed to the left of the keys already present, so the
    /// topmost of a run of equal keys is the oldest one.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<Handle, Error> {
        let own_weight = self.weigher.weight(&key);
        if !is_valid_weight(own_weight) {
            log::trace!("refusing key with weight {own_weight}");
            return Err(Error::InvalidWeight { weight: own_weight });
        }

        // Ordinary BST descent, starting below the header.
        let mut parent = Handle::ROOT;
        let mut current = self.root();
        let mut go_left = true;
        while current != Handle::NIL {
            parent = current;
            go_left = self.comparator.compare(&key, self.key(current)) != Ordering::Greater;
            current = if go_left { self.left(current) } else { self.right(current) };
        }

        let node = self.alloc(Node::new(key, value, parent, own_weight));
        if go_left {
            self.set_left(parent, node);
        } else {
            self.set_right(parent, node);
        }

        // The new node is a leaf, so every ancestor simply grows by its weight.
        self.add_to_ancestors(node, own_weight);
        self.insert_fixup(node);

        debug_assert!(self.sentinels_intact(), "sentinel corrupted by `insert()`");
        Ok(node)
    }

    /// Restores the red-black properties after `node` was attached as a red leaf.
    /// Rotations keep the aggregates right on their own.
    fn insert_fixup(&mut self, mut node: Handle) {
        // The header is black, so the loop never climbs past the real root.
        while self.is_red(self.parent(node)) {
            let parent = self.parent(node);
            let grandparent = self.parent(parent);

            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.right(parent) {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let parent = self.parent(node);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left(grandparent);
                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.left(parent) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = self.parent(node);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }

        let root = self.root();
        self.set_color(root, Color::Black);
    }
}
