//! Live-cell index: an [`RTree`] with unit payload, mirroring the set of
//! cell positions that currently exist (spec §4.3).

use gridkernel_common::{Position, Range};

use crate::rtree::RTree;

/// Mirrors cell-store membership exactly. Used to constrain dependency
/// traversal to positions that actually exist, so an expression referencing
/// a huge empty range (e.g. `A0:ZZ65535`) stays cheap to propagate through.
#[derive(Debug, Clone)]
pub struct LiveIndex {
    tree: RTree<()>,
}

impl LiveIndex {
    pub fn new(min_children: usize) -> Self {
        Self {
            tree: RTree::new(min_children),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn insert(&mut self, pos: Position) {
        self.tree.insert(Range::single(pos), ());
    }

    pub fn remove(&mut self, pos: Position) -> bool {
        self.tree.remove(&Range::single(pos)).is_some()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.tree.lookup_exact(&Range::single(pos)).is_some()
    }

    /// Every live position intersecting `query`, derived from the exact
    /// single-cell keys the R-tree's intersection scan returns.
    pub fn live_positions_in(&self, query: &Range) -> Vec<Position> {
        self.tree
            .range_search(query)
            .into_iter()
            .map(|(key, _)| key.tl())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_membership() {
        let mut idx = LiveIndex::new(2);
        let p = Position::new(3, 3);
        assert!(!idx.contains(p));
        idx.insert(p);
        assert!(idx.contains(p));
        assert!(idx.remove(p));
        assert!(!idx.contains(p));
    }

    #[test]
    fn live_positions_in_filters_to_existing_cells() {
        let mut idx = LiveIndex::new(2);
        idx.insert(Position::new(0, 0));
        idx.insert(Position::new(5, 5));
        let query = Range::new(Position::new(0, 0), Position::new(10, 10));
        let mut got = idx.live_positions_in(&query);
        got.sort();
        assert_eq!(got, vec![Position::new(0, 0), Position::new(5, 5)]);
    }
}
