use core::cmp::Ordering;

use smallvec::SmallVec;

use super::handle::Handle;
use super::node::Color;
use super::raw_cdf_tree::RawCdfTree;
use crate::compare::Comparator;
use crate::weight::Weigher;
use crate::{Error, Stats};

/// Relative tolerance when comparing a stored aggregate with the sum it stands for.
const WEIGHT_TOLERANCE: f64 = 1.0e-9;

/// Work-list entry for the depth-first walk: node, blacks above it, depth.
type Frame = (Handle, usize, usize);

impl<K, V, W, C> RawCdfTree<K, V, W, C> {
    /// Cheap check of the properties the sentinels must keep under every mutation.
    pub(crate) fn sentinels_intact(&self) -> bool {
        let nil = self.link(Handle::NIL);
        let header = self.link(Handle::ROOT);
        nil.color == Color::Black
            && nil.weight == 0.0
            && nil.left == Handle::NIL
            && nil.right == Handle::NIL
            && header.color == Color::Black
            && header.weight == 0.0
            && header.right == Handle::NIL
    }
}

impl<K, V, W: Weigher<K>, C: Comparator<K>> RawCdfTree<K, V, W, C> {
    /// Checks every structural invariant and returns shape statistics.
    pub(crate) fn validate(&self) -> Result<Stats, Error> {
        self.validate_sentinels()?;
        let (black_height, max_depth, counted) = self.validate_shape()?;
        if counted != self.len() {
            return Err(Error::LengthMismatch {
                counted,
                expected: self.len(),
            });
        }
        self.validate_order()?;
        Ok(Stats::new(self.len(), black_height, max_depth))
    }

    fn validate_sentinels(&self) -> Result<(), Error> {
        let nil = self.link(Handle::NIL);
        if nil.color != Color::Black {
            return Err(Error::CorruptSentinel("nil is red"));
        }
        if nil.weight != 0.0 {
            return Err(Error::CorruptSentinel("nil has a weight"));
        }
        if nil.left != Handle::NIL || nil.right != Handle::NIL {
            return Err(Error::CorruptSentinel("nil has children"));
        }
        let header = self.link(Handle::ROOT);
        if header.color != Color::Black {
            return Err(Error::CorruptSentinel("header is red"));
        }
        if header.weight != 0.0 {
            return Err(Error::CorruptSentinel("header has a weight"));
        }
        if header.right != Handle::NIL {
            return Err(Error::CorruptSentinel("header has a right child"));
        }
        let root = self.root();
        if root != Handle::NIL {
            if self.parent(root) != Handle::ROOT {
                return Err(Error::BrokenParentLink);
            }
            if self.is_red(root) {
                return Err(Error::ConsecutiveReds);
            }
        }
        Ok(())
    }

    /// Walks every root-to-nil path, checking colors, parent links and
    /// aggregates. Returns the black height, the maximum depth and the number of
    /// real nodes seen.
    fn validate_shape(&self) -> Result<(usize, usize, usize), Error> {
        let tolerance_base = self.total_weight().abs().max(1.0);
        let mut black_height: Option<usize> = None;
        let mut max_depth = 0;
        let mut counted = 0;

        let mut stack: SmallVec<[Frame; 64]> = SmallVec::new();
        if self.root() != Handle::NIL {
            stack.push((self.root(), 0, 1));
        }

        while let Some((node, blacks_above, depth)) = stack.pop() {
            counted += 1;
            max_depth = max_depth.max(depth);

            let red = self.is_red(node);
            let blacks = blacks_above + usize::from(!red);
            let (left, right) = (self.left(node), self.right(node));

            let own = self.own_weight(node);
            let fresh = self.weigher.weight(self.key(node));
            let expected = self.weight(left) + self.weight(right) + own;
            let stored = self.weight(node);
            let tolerance = WEIGHT_TOLERANCE * tolerance_base.max(stored.abs()).max(expected.abs());
            if (stored - expected).abs() > tolerance || (own - fresh).abs() > WEIGHT_TOLERANCE * own.abs().max(1.0) {
                return Err(Error::WeightMismatch { stored, expected });
            }

            for child in [left, right] {
                if child == Handle::NIL {
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(Error::UnbalancedBlacks(format!(
                                "path with {blacks} black nodes, expected {expected}"
                            )));
                        }
                        Some(_) => {}
                    }
                    continue;
                }
                if self.parent(child) != node {
                    return Err(Error::BrokenParentLink);
                }
                if red && self.is_red(child) {
                    return Err(Error::ConsecutiveReds);
                }
                stack.push((child, blacks, depth + 1));
            }
        }

        Ok((black_height.unwrap_or(0), max_depth, counted))
    }

    /// Checks that an in-order walk never steps down in key order.
    fn validate_order(&self) -> Result<(), Error> {
        let mut current = self.first();
        if current == Handle::NIL {
            return Ok(());
        }
        let mut next = self.successor(current);
        while next != Handle::NIL {
            if self.comparator.compare(self.key(current), self.key(next)) == Ordering::Greater {
                return Err(Error::SortError);
            }
            current = next;
            next = self.successor(current);
        }
        Ok(())
    }
}
