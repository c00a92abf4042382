//! Generic guided-split R-tree and its two specializations: the dependent
//! index (§4.2) and the live-cell index (§4.3).
//!
//! The tree itself (`rtree` module) knows nothing about spreadsheets; the
//! specializations are thin wrappers that give `V` a spreadsheet-shaped
//! meaning (an ordered sequence of dependent ranges, or nothing at all).

pub mod dependent_index;
pub mod live_index;
pub mod rtree;

pub use dependent_index::{DependentIndex, DependentSeq};
pub use live_index::LiveIndex;
pub use rtree::RTree;
