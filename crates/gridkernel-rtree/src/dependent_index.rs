//! Dependent index: an [`RTree`] specialization whose value at each indexed
//! range is an ordered sequence of ranges that depend on it (spec §4.2).

use gridkernel_common::Range;
use smallvec::SmallVec;

use crate::rtree::RTree;

/// A range's dependent sequence. Most indexed ranges have only a handful of
/// direct dependents, so this stays inline rather than allocating per entry.
pub type DependentSeq = SmallVec<[Range; 4]>;

/// Maps a range `R` to the ordered sequence of ranges that depend on it:
/// "if any cell in `R` changes, every cell in each dependent range must be
/// recomputed." Sequences never contain the empty range and a live entry's
/// sequence is never empty (spec §4.2 invariants).
#[derive(Debug, Clone)]
pub struct DependentIndex {
    tree: RTree<DependentSeq>,
}

impl DependentIndex {
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

    /// Append `value` to `key`'s dependent sequence, inserting a new
    /// singleton-sequence entry if `key` is not yet present.
    pub fn put(&mut self, key: Range, value: Range) {
        if let Some(seq) = self.tree.lookup_exact_mut(&key) {
            seq.push(value);
        } else {
            let mut seq = DependentSeq::new();
            seq.push(value);
            self.tree.insert(key, seq);
        }
    }

    /// Bulk form of [`DependentIndex::put`].
    pub fn put_slice(&mut self, key: Range, values: &[Range]) {
        if values.is_empty() {
            return;
        }
        if let Some(seq) = self.tree.lookup_exact_mut(&key) {
            seq.extend_from_slice(values);
        } else {
            self.tree.insert(key, DependentSeq::from_slice(values));
        }
    }

    /// Swap-remove the single occurrence of `value` from `key`'s sequence.
    /// If the sequence becomes empty, the key is removed entirely, which
    /// triggers the underlying R-tree's underflow handling.
    pub fn remove_value(&mut self, key: Range, value: Range) {
        let Some(seq) = self.tree.lookup_exact_mut(&key) else {
            return;
        };
        if let Some(pos) = seq.iter().position(|r| *r == value) {
            seq.swap_remove(pos);
        }
        if seq.is_empty() {
            self.tree.remove(&key);
        }
    }

    /// Unordered batch of every `(key, dependents)` pair whose key
    /// intersects `query`. Callers iterate every position in every returned
    /// range themselves.
    pub fn search(&self, query: &Range) -> Vec<(Range, &DependentSeq)> {
        self.tree.range_search(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkernel_common::Position;

    fn r(x0: u16, y0: u16, x1: u16, y1: u16) -> Range {
        Range::new(Position::new(x0, y0), Position::new(x1, y1))
    }

    #[test]
    fn put_accumulates_multiple_dependents() {
        let mut idx = DependentIndex::new(2);
        let key = r(0, 0, 4, 0);
        idx.put(key, r(0, 1, 0, 1));
        idx.put(key, r(1, 1, 1, 1));
        let (_, deps) = idx
            .search(&key)
            .into_iter()
            .find(|(k, _)| *k == key)
            .unwrap();
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn remove_value_drops_empty_entry() {
        let mut idx = DependentIndex::new(2);
        let key = r(0, 0, 0, 0);
        let dep = r(1, 1, 1, 1);
        idx.put(key, dep);
        assert_eq!(idx.len(), 1);
        idx.remove_value(key, dep);
        assert_eq!(idx.len(), 0);
        assert!(idx.search(&key).is_empty());
    }

    #[test]
    fn put_slice_bulk_appends() {
        let mut idx = DependentIndex::new(2);
        let key = r(0, 0, 0, 9);
        idx.put_slice(key, &[r(1, 0, 1, 0), r(2, 0, 2, 0)]);
        let (_, deps) = idx.search(&key).into_iter().next().unwrap();
        assert_eq!(deps.len(), 2);
    }
}
