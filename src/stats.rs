/// Shape statistics gathered by [`CdfTree::validate`](crate::CdfTree::validate).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    len: usize,
    black_height: usize,
    max_depth: usize,
}

impl Stats {
    pub(crate) const fn new(len: usize, black_height: usize, max_depth: usize) -> Self {
        Self {
            len,
            black_height,
            max_depth,
        }
    }

    /// Number of entries in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the validated tree was empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of black nodes on every path from the root down to `nil`, the
    /// root included and `nil` excluded.
    #[must_use]
    pub const fn black_height(&self) -> usize {
        self.black_height
    }

    /// Depth of the deepest node; the root has depth 1.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}
