use thiserror::Error as ThisError;

use crate::NodeHandle;

/// Errors reported by [`CdfTree`](crate::CdfTree) and its weighers.
///
/// The first group are caller errors. The validation group is only produced by
/// [`CdfTree::validate`](crate::CdfTree::validate) and always indicates a bug in
/// this crate.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    /// The handle was issued by a different tree.
    #[error("handle {0:?} was issued by a different tree")]
    ForeignHandle(NodeHandle),
    /// The node behind the handle has been removed, or the tree was cleared.
    #[error("handle {0:?} refers to a node that is no longer in the tree")]
    StaleHandle(NodeHandle),
    /// The weigher produced a NaN, infinite or negative weight for a key.
    #[error("weight {weight} is not a finite, non-negative number")]
    InvalidWeight { weight: f64 },
    /// A power-law exponent that is NaN or infinite.
    #[error("exponent {0} is not a finite number")]
    InvalidExponent(f64),

    /// A red node with a red child.
    #[error("red node has a red child")]
    ConsecutiveReds,
    /// Two root-to-nil paths with different black counts.
    #[error("unbalanced black height: {0}")]
    UnbalancedBlacks(String),
    /// In-order traversal found a key greater than its successor.
    #[error("keys are not in sorted order")]
    SortError,
    /// A node's aggregate differs from the sum over its subtree.
    #[error("aggregate weight mismatch: stored {stored}, expected {expected}")]
    WeightMismatch { stored: f64, expected: f64 },
    /// A child whose parent pointer does not lead back to its parent.
    #[error("child's parent pointer does not lead back to its parent")]
    BrokenParentLink,
    /// A sentinel gained a color, a weight or a child it must never have.
    #[error("sentinel corrupted: {0}")]
    CorruptSentinel(&'static str),
    /// The number of reachable nodes differs from the number of allocated nodes.
    #[error("reachable nodes ({counted}) differ from stored nodes ({expected})")]
    LengthMismatch { counted: usize, expected: usize },
}
