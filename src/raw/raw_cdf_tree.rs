use core::cmp::Ordering;
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Link, Node};
use crate::compare::Comparator;
use crate::{Error, NodeHandle};

/// Source of per-tree ids, so handles can be traced back to the tree that issued them.
static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(0);

/// The red-black engine backing `CdfTree`.
///
/// Real nodes live in an arena. The two sentinels are stored inline and addressed
/// through the reserved handles [`Handle::NIL`] and [`Handle::ROOT`], so every
/// link walk can treat "no child" and "above the root" like ordinary nodes.
pub(crate) struct RawCdfTree<K, V, W, C> {
    /// Id stamped into every `NodeHandle` issued by this tree.
    id: u32,
    /// Arena storing all real nodes.
    nodes: Arena<Node<K, V>>,
    /// Link set of the `nil` sentinel. Only its parent pointer ever changes.
    nil: Link,
    /// Link set of the header sentinel; `header.left` is the real root.
    header: Link,
    pub(crate) weigher: W,
    pub(crate) comparator: C,
}

impl<K, V, W, C> RawCdfTree<K, V, W, C> {
    /// Creates a new, empty tree.
    pub(crate) fn new(comparator: C, weigher: W) -> Self {
        Self::with_arena(Arena::new(), comparator, weigher)
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize, comparator: C, weigher: W) -> Self {
        Self::with_arena(Arena::with_capacity(capacity), comparator, weigher)
    }

    fn with_arena(nodes: Arena<Node<K, V>>, comparator: C, weigher: W) -> Self {
        Self {
            id: NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            nodes,
            nil: Link::sentinel(),
            header: Link::sentinel(),
            weigher,
            comparator,
        }
    }

    /// Returns the number of nodes in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree contains no nodes.
    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the capacity of the node arena.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Drops every node. Handles issued before the call become stale.
    pub(crate) fn clear(&mut self) {
        log::debug!("clearing tree {} with {} nodes", self.id, self.len());
        self.nodes.clear();
        self.nil = Link::sentinel();
        self.header = Link::sentinel();
    }

    /// Returns the real root, `nil` if the tree is empty.
    #[inline]
    pub(crate) fn root(&self) -> Handle {
        self.header.left
    }

    // ─── Handle translation ─────────────────────────────────────────────────

    /// Wraps a live slot into a public handle.
    pub(crate) fn handle_of(&self, node: Handle) -> NodeHandle {
        NodeHandle::new(self.id, node, self.nodes.generation(node))
    }

    /// Wraps a slot into a public handle, mapping `nil` to `None`.
    pub(crate) fn handle_of_opt(&self, node: Handle) -> Option<NodeHandle> {
        (node != Handle::NIL).then(|| self.handle_of(node))
    }

    /// Resolves a public handle to a live slot of this tree.
    pub(crate) fn resolve(&self, handle: NodeHandle) -> Result<Handle, Error> {
        if handle.tree() != self.id {
            log::trace!("tree {} rejected foreign handle {handle:?}", self.id);
            return Err(Error::ForeignHandle(handle));
        }
        if !self.nodes.is_live(handle.slot(), handle.generation()) {
            log::trace!("tree {} rejected stale handle {handle:?}", self.id);
            return Err(Error::StaleHandle(handle));
        }
        Ok(handle.slot())
    }

    // ─── Link accessors ─────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn link(&self, node: Handle) -> &Link {
        match node {
            Handle::NIL => &self.nil,
            Handle::ROOT => &self.header,
            _ => &self.nodes.get(node).link,
        }
    }

    #[inline]
    fn link_mut(&mut self, node: Handle) -> &mut Link {
        match node {
            Handle::NIL => &mut self.nil,
            Handle::ROOT => &mut self.header,
            _ => &mut self.nodes.get_mut(node).link,
        }
    }

    #[inline]
    pub(crate) fn left(&self, node: Handle) -> Handle {
        self.link(node).left
    }

    #[inline]
    pub(crate) fn right(&self, node: Handle) -> Handle {
        self.link(node).right
    }

    #[inline]
    pub(crate) fn parent(&self, node: Handle) -> Handle {
        self.link(node).parent
    }

    #[inline]
    pub(crate) fn color(&self, node: Handle) -> Color {
        self.link(node).color
    }

    #[inline]
    pub(crate) fn is_red(&self, node: Handle) -> bool {
        self.color(node) == Color::Red
    }

    /// Aggregate weight of the subtree rooted at `node`; 0.0 for the sentinels.
    #[inline]
    pub(crate) fn weight(&self, node: Handle) -> f64 {
        self.link(node).weight
    }

    #[inline]
    pub(crate) fn set_left(&mut self, node: Handle, child: Handle) {
        debug_assert!(node != Handle::NIL, "`nil` never gains a child");
        self.link_mut(node).left = child;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, node: Handle, child: Handle) {
        debug_assert!(node != Handle::NIL && node != Handle::ROOT, "sentinels never gain a right child");
        self.link_mut(node).right = child;
    }

    /// Sets the parent pointer. Allowed on `nil`: deletion parks the splice point
    /// there for the fixup to climb from.
    #[inline]
    pub(crate) fn set_parent(&mut self, node: Handle, parent: Handle) {
        self.link_mut(node).parent = parent;
    }

    /// Recolors a real node. Painting a sentinel black is a no-op; painting one
    /// red is a bug.
    #[inline]
    pub(crate) fn set_color(&mut self, node: Handle, color: Color) {
        if node.is_sentinel() {
            debug_assert!(color == Color::Black, "sentinels are always black");
            return;
        }
        self.link_mut(node).color = color;
    }

    /// Weight the node's own key contributes; 0.0 for the sentinels.
    #[inline]
    pub(crate) fn own_weight(&self, node: Handle) -> f64 {
        if node.is_sentinel() { 0.0 } else { self.nodes.get(node).own_weight }
    }

    /// Recomputes a real node's aggregate from its children.
    #[inline]
    pub(crate) fn update_weight(&mut self, node: Handle) {
        debug_assert!(!node.is_sentinel(), "sentinel weights are fixed at 0.0");
        let weight = self.weight(self.left(node)) + self.weight(self.right(node)) + self.own_weight(node);
        self.link_mut(node).weight = weight;
    }

    /// Adds `delta` to the aggregate of every strict ancestor of `node`, stopping
    /// below the header.
    pub(crate) fn add_to_ancestors(&mut self, node: Handle, delta: f64) {
        let mut current = self.parent(node);
        while current != Handle::ROOT {
            self.link_mut(current).weight += delta;
            current = self.parent(current);
        }
    }

    // ─── Node storage ───────────────────────────────────────────────────────

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> Handle {
        self.nodes.alloc(node)
    }

    pub(crate) fn take(&mut self, node: Handle) -> Node<K, V> {
        self.nodes.take(node)
    }

    #[inline]
    pub(crate) fn key(&self, node: Handle) -> &K {
        &self.nodes.get(node).key
    }

    #[inline]
    pub(crate) fn value(&self, node: Handle) -> &V {
        &self.nodes.get(node).value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, node: Handle) -> &mut V {
        &mut self.nodes.get_mut(node).value
    }

    #[inline]
    pub(crate) fn entry(&self, node: Handle) -> (&K, &V) {
        let node = self.nodes.get(node);
        (&node.key, &node.value)
    }

    // ─── Traversal ──────────────────────────────────────────────────────────

    /// Leftmost node of the subtree at `node`.
    pub(crate) fn minimum(&self, mut node: Handle) -> Handle {
        while self.left(node) != Handle::NIL {
            node = self.left(node);
        }
        node
    }

    /// Rightmost node of the subtree at `node`.
    pub(crate) fn maximum(&self, mut node: Handle) -> Handle {
        while self.right(node) != Handle::NIL {
            node = self.right(node);
        }
        node
    }

    /// Smallest node of the tree, `nil` if empty.
    pub(crate) fn first(&self) -> Handle {
        match self.root() {
            Handle::NIL => Handle::NIL,
            root => self.minimum(root),
        }
    }

    /// Largest node of the tree, `nil` if empty.
    pub(crate) fn last(&self) -> Handle {
        match self.root() {
            Handle::NIL => Handle::NIL,
            root => self.maximum(root),
        }
    }

    /// In-order successor of a real node, `nil` after the last one.
    pub(crate) fn successor(&self, mut node: Handle) -> Handle {
        let right = self.right(node);
        if right != Handle::NIL {
            return self.minimum(right);
        }
        let mut parent = self.parent(node);
        // The real root is the header's left child, so the climb always ends there.
        while node == self.right(parent) {
            node = parent;
            parent = self.parent(parent);
        }
        if parent == Handle::ROOT { Handle::NIL } else { parent }
    }

    /// In-order predecessor of a real node, `nil` before the first one.
    pub(crate) fn predecessor(&self, mut node: Handle) -> Handle {
        let left = self.left(node);
        if left != Handle::NIL {
            return self.maximum(left);
        }
        let mut parent = self.parent(node);
        while node == self.left(parent) {
            if parent == Handle::ROOT {
                return Handle::NIL;
            }
            node = parent;
            parent = self.parent(parent);
        }
        parent
    }

    // ─── Rank ───────────────────────────────────────────────────────────────

    /// Total weight of all nodes.
    pub(crate) fn total_weight(&self) -> f64 {
        self.weight(self.root())
    }

    /// Cumulative weight of every node that precedes `node` in order.
    pub(crate) fn rank(&self, node: Handle) -> f64 {
        debug_assert!(!node.is_sentinel(), "rank of a sentinel is undefined");
        let mut rank = self.weight(self.left(node));
        let mut current = node;
        loop {
            let parent = self.parent(current);
            if parent == Handle::ROOT {
                break rank;
            }
            if current == self.right(parent) {
                rank += self.weight(self.left(parent)) + self.own_weight(parent);
            }
            current = parent;
        }
    }
}

impl<K, V, W, C: Comparator<K>> RawCdfTree<K, V, W, C> {
    /// Topmost node whose key compares equal to `key`.
    pub(crate) fn find(&self, key: &K) -> Option<Handle> {
        let mut current = self.root();
        while current != Handle::NIL {
            current = match self.comparator.compare(key, self.key(current)) {
                Ordering::Less => self.left(current),
                Ordering::Greater => self.right(current),
                Ordering::Equal => return Some(current),
            };
        }
        None
    }

    /// First node, in order, whose key is not less than `key`; `nil` if none.
    pub(crate) fn lower_bound(&self, key: &K) -> Handle {
        let mut current = self.root();
        let mut candidate = Handle::NIL;
        while current != Handle::NIL {
            if self.comparator.compare(self.key(current), key) == Ordering::Less {
                current = self.right(current);
            } else {
                candidate = current;
                current = self.left(current);
            }
        }
        candidate
    }

    /// First node, in order, whose key is greater than `key`; `nil` if none.
    pub(crate) fn upper_bound(&self, key: &K) -> Handle {
        let mut current = self.root();
        let mut candidate = Handle::NIL;
        while current != Handle::NIL {
            if self.comparator.compare(self.key(current), key) == Ordering::Greater {
                candidate = current;
                current = self.left(current);
            } else {
                current = self.right(current);
            }
        }
        candidate
    }

    /// Cumulative weight of every node whose key is strictly less than `key`.
    pub(crate) fn rank_of_key(&self, key: &K) -> f64 {
        let mut rank = 0.0;
        let mut current = self.root();
        while current != Handle::NIL {
            if self.comparator.compare(self.key(current), key) == Ordering::Less {
                rank += self.weight(self.left(current)) + self.own_weight(current);
                current = self.right(current);
            } else {
                current = self.left(current);
            }
        }
        rank
    }
}
