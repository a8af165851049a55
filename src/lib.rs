//! A weighted order-statistic tree for cumulative-rank queries.
//!
//! This crate provides [`CdfTree`], a red-black tree whose keys each carry a
//! non-negative weight. Every node caches the total weight of its subtree, so the
//! cumulative weight of all keys before a node is available in O(log n):
//!
//! - [`rank`](CdfTree::rank) - Total weight of the entries preceding a node
//! - [`cdf`](CdfTree::cdf) - The same, as a fraction of the total weight
//! - [`rank_of_key`](CdfTree::rank_of_key) - Total weight of all keys below an arbitrary key
//!
//! Weights come from a [`Weigher`]. [`Uniform`] gives every key weight 1 and turns
//! ranks into plain order statistics; [`Power`] weighs a numeric key `x` as `x^p`.
//!
//! # Example
//!
//! ```
//! use cdf_tree::{CdfTree, Power};
//!
//! let mut samples = CdfTree::new(Power::new(1.0).unwrap());
//! let handles: Vec<_> = [3, 1, 4, 1, 5]
//!     .into_iter()
//!     .map(|x| samples.insert(x, ()).unwrap())
//!     .collect();
//!
//! // The keys sum to 14; 1 + 1 + 3 of that lies before the 4.
//! assert_eq!(samples.total_weight(), 14.0);
//! assert_eq!(samples.rank(handles[2]), Ok(5.0));
//!
//! // Handles survive removals of other entries.
//! samples.remove(handles[0]).unwrap();
//! assert_eq!(samples.rank(handles[2]), Ok(2.0));
//! ```
//!
//! # Features
//!
//! - **Stable handles** - Insertion returns a [`NodeHandle`] that keeps referring to
//!   its entry until the entry is removed
//! - **Checked handles** - Stale or foreign handles are reported as [`Error`]s
//! - **Duplicates** - Equal keys are kept side by side
//! - **Pluggable order and weights** - Any [`Comparator`] and [`Weigher`], closures included
//!
//! # Implementation
//!
//! Nodes live in a generational arena and refer to each other by index. The
//! classic `nil` and header sentinels are reserved indices, so rotations and
//! deletion fixups never special-case a missing child or the top of the tree.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod compare;
mod error;
mod node_handle;
mod raw;
mod stats;

pub mod cdf_tree;
pub mod weight;

pub use cdf_tree::CdfTree;
pub use compare::{Comparator, Natural};
pub use error::Error;
pub use node_handle::NodeHandle;
pub use stats::Stats;
pub use weight::{Power, Uniform, Weigher};
