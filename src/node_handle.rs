use crate::raw::Handle;

/// A stable reference to a node inserted into a [`CdfTree`](crate::CdfTree).
///
/// Handles are returned by [`CdfTree::insert`](crate::CdfTree::insert) and stay
/// valid until the node is removed or the tree is cleared or dropped. A handle is
/// tied to the tree that issued it: passing it to another tree, or using it after
/// its node is gone, is reported as an [`Error`](crate::Error) rather than
/// silently resolving to some other node.
///
/// # Examples
///
/// ```
/// use cdf_tree::{CdfTree, Error, Uniform};
///
/// let mut tree = CdfTree::new(Uniform);
/// let handle = tree.insert(3, "three").unwrap();
/// assert_eq!(tree.key(handle), Ok(&3));
///
/// tree.remove(handle).unwrap();
/// assert_eq!(tree.key(handle), Err(Error::StaleHandle(handle)));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeHandle {
    tree: u32,
    slot: Handle,
    generation: u32,
}

impl NodeHandle {
    pub(crate) const fn new(tree: u32, slot: Handle, generation: u32) -> Self {
        Self { tree, slot, generation }
    }

    pub(crate) const fn tree(self) -> u32 {
        self.tree
    }

    pub(crate) const fn slot(self) -> Handle {
        self.slot
    }

    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}
