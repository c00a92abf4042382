//! Ordered cell store plus its parallel out-of-line string map (spec §3, §4.5,
//! §9 "Ordered cell store").

use gridkernel_common::{CellValue, Expr, KernelError, Position, StringHandle, StringPool};
use rustc_hash::FxHashMap;

use crate::cell::{CellRecord, CellState};

/// The pool a cell with no string literals behaves as: every handle resolves
/// to the empty string, matching spec §3's "absent entry ≡ empty string".
pub(crate) struct EmptyPool;

impl StringPool for EmptyPool {
    fn get(&self, _handle: StringHandle) -> &str {
        ""
    }
}

/// Insertion-ordered-by-`hash(pos)` map from [`Position`] to [`CellRecord`].
/// A `Vec` kept sorted by key gives canonical row-major iteration (spec §9)
/// at the cost of `O(n)` insertion/removal, which is acceptable at the scale
/// this kernel targets (a terminal-sized sparse grid, not a bulk OLAP table).
pub(crate) struct CellStore {
    entries: Vec<(Position, CellRecord)>,
}

impl CellStore {
    pub(crate) fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn search(&self, pos: Position) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&pos.hash(), |(p, _)| p.hash())
    }

    pub(crate) fn try_reserve_one(&mut self) -> Result<(), KernelError> {
        self.entries.try_reserve(1).map_err(|_| KernelError::OutOfMemory)
    }

    pub(crate) fn exists(&self, pos: Position) -> bool {
        self.search(pos).is_ok()
    }

    pub(crate) fn state(&self, pos: Position) -> Option<CellState> {
        self.search(pos).ok().map(|i| self.entries[i].1.state)
    }

    pub(crate) fn set_state(&mut self, pos: Position, state: CellState) {
        if let Ok(i) = self.search(pos) {
            self.entries[i].1.state = state;
        }
    }

    pub(crate) fn value(&self, pos: Position) -> CellValue {
        self.search(pos)
            .ok()
            .map(|i| self.entries[i].1.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    pub(crate) fn set_value(&mut self, pos: Position, value: CellValue) {
        if let Ok(i) = self.search(pos) {
            self.entries[i].1.value = value;
        }
    }

    /// Insert a brand-new record at `pos`. Callers must already know no
    /// record exists there (`try_reserve_one` must have succeeded first).
    pub(crate) fn insert_new(&mut self, pos: Position, record: CellRecord) {
        let idx = self.search(pos).expect_err("insert_new called on an occupied position");
        self.entries.insert(idx, (pos, record));
    }

    /// Replace the record at an occupied `pos`, returning the prior one.
    pub(crate) fn replace(&mut self, pos: Position, record: CellRecord) -> CellRecord {
        let idx = self.search(pos).expect("replace called on an empty position");
        std::mem::replace(&mut self.entries[idx].1, record)
    }

    pub(crate) fn remove(&mut self, pos: Position) -> Option<CellRecord> {
        let idx = self.search(pos).ok()?;
        Some(self.entries.remove(idx).1)
    }

    pub(crate) fn take_expr(&mut self, pos: Position) -> Option<Box<dyn Expr>> {
        let i = self.search(pos).ok()?;
        self.entries[i].1.expr.take()
    }

    pub(crate) fn restore_expr(&mut self, pos: Position, expr: Box<dyn Expr>) {
        if let Ok(i) = self.search(pos) {
            self.entries[i].1.expr = Some(expr);
        }
    }

    /// Read-only access to the expression at `pos`, for serializing it back
    /// to text. `None` both when no cell exists and during the brief window
    /// an in-flight `eval` has the expression taken out.
    pub(crate) fn expr_ref(&self, pos: Position) -> Option<&dyn Expr> {
        self.search(pos).ok().and_then(|i| self.entries[i].1.expr.as_deref())
    }

    pub(crate) fn referenced_ranges(&self, pos: Position) -> Vec<gridkernel_common::Range> {
        self.search(pos)
            .ok()
            .and_then(|i| self.entries[i].1.expr.as_ref())
            .map(|e| e.referenced_ranges())
            .unwrap_or_default()
    }

    /// Positions in canonical ascending-`hash` order, the order spec §9
    /// relies on for file I/O and "next populated cell" navigation.
    pub(crate) fn ordered_positions(&self) -> Vec<Position> {
        self.entries.iter().map(|(p, _)| *p).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Out-of-line string literal storage, parallel to [`CellStore`] and keyed by
/// the same positions (spec §3: "absent entry ≡ empty string"); a cell with
/// no entry here behaves as [`EmptyPool`].
pub(crate) struct StringMap {
    map: FxHashMap<Position, Box<dyn StringPool>>,
}

impl StringMap {
    pub(crate) fn new() -> Self {
        Self { map: FxHashMap::default() }
    }

    pub(crate) fn try_reserve_one(&mut self) -> Result<(), KernelError> {
        self.map.try_reserve(1).map_err(|_| KernelError::OutOfMemory)
    }

    pub(crate) fn set(&mut self, pos: Position, pool: Box<dyn StringPool>) {
        self.map.insert(pos, pool);
    }

    pub(crate) fn remove(&mut self, pos: Position) -> Option<Box<dyn StringPool>> {
        self.map.remove(&pos)
    }

    /// Temporarily remove `pos`'s pool so the evaluator can borrow `&mut
    /// Sheet` without an overlapping borrow on this map, mirroring
    /// [`CellStore::take_expr`]. Positions with no interned strings have no
    /// entry to begin with, so callers fall back to [`EmptyPool`].
    pub(crate) fn take(&mut self, pos: Position) -> Option<Box<dyn StringPool>> {
        self.map.remove(&pos)
    }

    /// Read-only access for serialization: `pos`'s pool, or the shared empty
    /// pool if it has no interned strings.
    pub(crate) fn get_or_empty(&self, pos: Position) -> &dyn StringPool {
        self.map.get(&pos).map(|b| b.as_ref()).unwrap_or(&EMPTY_POOL)
    }
}

static EMPTY_POOL: EmptyPool = EmptyPool;
