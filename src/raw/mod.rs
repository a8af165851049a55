mod arena;
mod handle;
mod insert;
mod node;
mod raw_cdf_tree;
mod remove;
mod rotate;
mod validate;

pub(crate) use handle::Handle;
pub(crate) use raw_cdf_tree::RawCdfTree;
