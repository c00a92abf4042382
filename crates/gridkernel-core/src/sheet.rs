//! The kernel's front-end-facing API (spec §6): a single [`Sheet`] assembling
//! the cell store, undo/redo log, and the spatial indexes that back the
//! incremental evaluation engine.

use std::collections::VecDeque;

use gridkernel_common::{CellValue, Expr, KernelError, Position, Range, Resolver, StringPool};
use gridkernel_rtree::{DependentIndex, LiveIndex};

use crate::cell::{CellRecord, CellState};
use crate::column::{ColumnMap, ColumnMeta};
use crate::store::{CellStore, StringMap};
use crate::undo::{ArchivedCell, LogSide, UndoEntry, UndoRedoLog};

/// `min_children` for every spatial index a `Sheet` owns; `max_children` is
/// `2 * MIN_CHILDREN` per the R-tree's own convention.
const MIN_CHILDREN: usize = 4;

/// The spreadsheet kernel. Owns every allocation reachable from the cell
/// store, the two spatial indexes, the undo/redo log, and the column map
/// (spec §5 "shared-resource policy").
pub struct Sheet {
    cells: CellStore,
    strings: StringMap,
    columns: ColumnMap,
    dep_index: DependentIndex,
    live_index: LiveIndex,
    queue: VecDeque<Position>,
    log: UndoRedoLog,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Sheet {
    pub fn new() -> Self {
        Self {
            cells: CellStore::new(),
            strings: StringMap::new(),
            columns: ColumnMap::default(),
            dep_index: DependentIndex::new(MIN_CHILDREN),
            live_index: LiveIndex::new(MIN_CHILDREN),
            queue: VecDeque::new(),
            log: UndoRedoLog::default(),
        }
    }

    // ---- assignment path (spec §4.5) -----------------------------------

    /// The single assignment entry point: install `expr` (backed by `pool`
    /// for any string literals it carries) at `pos`, replacing whatever was
    /// there before.
    #[tracing::instrument(skip(self, expr, pool))]
    pub fn insert(
        &mut self,
        pos: Position,
        expr: Box<dyn Expr>,
        pool: Box<dyn StringPool>,
    ) -> Result<(), KernelError> {
        self.insert_on(pos, expr, pool, LogSide::Undo, true)
    }

    fn insert_on(
        &mut self,
        pos: Position,
        expr: Box<dyn Expr>,
        pool: Box<dyn StringPool>,
        side: LogSide,
        clear_redos: bool,
    ) -> Result<(), KernelError> {
        let existed = self.cells.exists(pos);

        self.cells.try_reserve_one()?;
        self.strings.try_reserve_one()?;
        self.queue.try_reserve(1).map_err(|_| KernelError::OutOfMemory)?;
        self.log.try_reserve_one(side)?;
        if existed {
            self.log.arena.try_reserve_one()?;
        }

        let new_ranges = expr.referenced_ranges();

        if !existed {
            self.live_index.insert(pos);
        }
        for r in &new_ranges {
            self.dep_index.put(*r, Range::single(pos));
        }

        if !existed {
            self.cells.insert_new(pos, CellRecord::new(expr));
            self.strings.set(pos, pool);
            self.log.push(UndoEntry::DeleteCell { pos }, side, clear_redos);
        } else {
            for r in self.cells.referenced_ranges(pos) {
                self.dep_index.remove_value(r, Range::single(pos));
            }
            let old_record = self.cells.replace(pos, CellRecord::new(expr));
            let old_pool = self.strings.remove(pos).expect("occupied cell always has a pool entry");
            self.strings.set(pos, pool);
            let old_expr = old_record.expr.expect("occupied record holds its expr outside eval");
            let handle = self.log.arena.archive(ArchivedCell { expr: old_expr, pool: old_pool });
            self.log.push(UndoEntry::SetCell { pos, handle }, side, clear_redos);
        }

        self.enqueue_trigger(pos);
        tracing::debug!(?pos, "cell assigned");
        Ok(())
    }

    /// Symmetric inverse of [`Sheet::insert`]: remove whatever is at `pos`.
    /// A no-op if nothing is there.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, pos: Position) -> Result<(), KernelError> {
        self.delete_on(pos, LogSide::Undo, true)
    }

    fn delete_on(&mut self, pos: Position, side: LogSide, clear_redos: bool) -> Result<(), KernelError> {
        if !self.cells.exists(pos) {
            return Ok(());
        }
        self.log.try_reserve_one(side)?;
        self.log.arena.try_reserve_one()?;

        for r in self.cells.referenced_ranges(pos) {
            self.dep_index.remove_value(r, Range::single(pos));
        }
        self.live_index.remove(pos);
        let old_record = self.cells.remove(pos).expect("checked exists above");
        let old_pool = self.strings.remove(pos).expect("occupied cell always has a pool entry");
        let old_expr = old_record.expr.expect("occupied record holds its expr outside eval");
        let handle = self.log.arena.archive(ArchivedCell { expr: old_expr, pool: old_pool });
        self.log.push(UndoEntry::SetCell { pos, handle }, side, clear_redos);

        self.queue.push_back(pos);
        tracing::debug!(?pos, "cell deleted");
        Ok(())
    }

    /// Delete every cell whose position lies in `range`, iterating the cell
    /// store in its canonical order; all deletions share one undo group
    /// (spec §4.5).
    pub fn delete_in_range(&mut self, range: Range) -> Result<(), KernelError> {
        let targets: Vec<Position> = self
            .cells
            .ordered_positions()
            .into_iter()
            .filter(|p| range.contains_point(*p))
            .collect();
        for pos in targets {
            self.delete_on(pos, LogSide::Undo, true)?;
        }
        self.log.end_group();
        Ok(())
    }

    fn enqueue_trigger(&mut self, pos: Position) {
        if self.cells.state(pos) != Some(CellState::Enqueued) {
            self.cells.set_state(pos, CellState::Enqueued);
            self.queue.push_back(pos);
        }
    }

    // ---- column metadata -------------------------------------------------

    pub fn set_width(&mut self, col: u16, width: u16) -> Result<(), KernelError> {
        self.set_width_on(col, width, LogSide::Undo, true)
    }

    fn set_width_on(&mut self, col: u16, width: u16, side: LogSide, clear_redos: bool) -> Result<(), KernelError> {
        self.log.try_reserve_one(side)?;
        let old = self.columns.get(col).width;
        self.columns.set_width(col, width);
        self.log.push(UndoEntry::SetColumnWidth { col, old }, side, clear_redos);
        Ok(())
    }

    pub fn inc_width(&mut self, col: u16) -> Result<(), KernelError> {
        let cur = self.columns.get(col).width;
        self.set_width(col, cur.saturating_add(1))
    }

    pub fn dec_width(&mut self, col: u16) -> Result<(), KernelError> {
        let cur = self.columns.get(col).width;
        self.set_width(col, cur.saturating_sub(1).max(1))
    }

    pub fn set_precision(&mut self, col: u16, precision: u8) -> Result<(), KernelError> {
        self.set_precision_on(col, precision, LogSide::Undo, true)
    }

    fn set_precision_on(
        &mut self,
        col: u16,
        precision: u8,
        side: LogSide,
        clear_redos: bool,
    ) -> Result<(), KernelError> {
        self.log.try_reserve_one(side)?;
        let old = self.columns.get(col).precision;
        self.columns.set_precision(col, precision);
        self.log.push(UndoEntry::SetColumnPrecision { col, old }, side, clear_redos);
        Ok(())
    }

    pub fn inc_precision(&mut self, col: u16) -> Result<(), KernelError> {
        let cur = self.columns.get(col).precision;
        self.set_precision(col, cur.saturating_add(1))
    }

    pub fn dec_precision(&mut self, col: u16) -> Result<(), KernelError> {
        let cur = self.columns.get(col).precision;
        self.set_precision(col, cur.saturating_sub(1))
    }

    pub fn column_at(&self, col: u16) -> ColumnMeta {
        self.columns.get(col)
    }

    /// Walk `col`'s live cells and measure each one's rendered text length
    /// at `precision`, capped at `cap` (spec §3's "Supplemented features":
    /// the body behind the front-end's auto-fit call).
    pub fn width_needed_for_column(&self, col: u16, precision: u8, cap: u16) -> u16 {
        let whole_column = Range::new(Position::new(col, 0), Position::new(col, u16::MAX));
        let mut needed = 1u16;
        for pos in self.live_index.live_positions_in(&whole_column) {
            let rendered = render_value(&self.cells.value(pos), precision);
            needed = needed.max(rendered.chars().count() as u16);
        }
        needed.min(cap)
    }

    // ---- reads -------------------------------------------------------

    pub fn cell_at(&self, pos: Position) -> Option<CellValue> {
        self.cells.exists(pos).then(|| self.cells.value(pos))
    }

    /// Serialize the expression at `pos` back to source text, for the
    /// persisted-format writer (spec §3's supplemented round-trip feature).
    pub fn expression_text(&self, pos: Position) -> Option<String> {
        let expr = self.cells.expr_ref(pos)?;
        let pool = self.strings.get_or_empty(pos);
        let mut out = String::new();
        expr.print(&mut out, pool).ok()?;
        Some(out)
    }

    pub fn ordered_positions(&self) -> Vec<Position> {
        self.cells.ordered_positions()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.len() == 0
    }

    // ---- evaluation engine (spec §4.6) -----------------------------------

    /// Run the dirty-mark pass followed by on-demand evaluation, draining
    /// the trigger queue built up by prior `insert`/`delete` calls. A no-op
    /// if nothing is queued.
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let triggers: Vec<Position> = self.queue.iter().copied().collect();
        for pos in triggers {
            self.mark_dirty_recursive(pos);
        }
        while let Some(pos) = self.queue.pop_front() {
            self.eval(pos);
        }
    }

    /// Every live position whose dependent sequence includes `pos`: cells
    /// whose expression references a range containing `pos`.
    fn direct_dependents(&self, pos: Position) -> Vec<Position> {
        let query = Range::single(pos);
        let mut out = Vec::new();
        for (_, deps) in self.dep_index.search(&query) {
            for dep_range in deps {
                out.extend(self.live_index.live_positions_in(dep_range));
            }
        }
        out
    }

    /// Recursively mark every transitive dependent of `pos` as `Dirty`.
    /// Already-dirty (or enqueued/computing) cells are skipped, which is
    /// what terminates the recursion on a cyclic dependency graph.
    fn mark_dirty_recursive(&mut self, pos: Position) {
        for dep in self.direct_dependents(pos) {
            if self.cells.state(dep) == Some(CellState::UpToDate) {
                self.cells.set_state(dep, CellState::Dirty);
                self.mark_dirty_recursive(dep);
            }
        }
    }

    /// Enqueue every direct dependent of `pos` that is currently `Dirty`,
    /// promoting it to `Enqueued`.
    fn enqueue_direct_dependents(&mut self, pos: Position) {
        for dep in self.direct_dependents(pos) {
            if self.cells.state(dep) == Some(CellState::Dirty) {
                self.cells.set_state(dep, CellState::Enqueued);
                self.queue.push_back(dep);
            }
        }
    }

    /// The state-machine evaluator (spec §4.6). Recurses into `eval` for
    /// other positions via the [`Resolver`] passed to the expression; the
    /// `Computing` guard on this cell is the only thing standing between
    /// that recursion and a dependency cycle.
    fn eval(&mut self, pos: Position) -> CellValue {
        match self.cells.state(pos) {
            None => {
                self.enqueue_direct_dependents(pos);
                CellValue::Empty
            }
            Some(CellState::UpToDate) => self.cells.value(pos),
            Some(CellState::Computing) => {
                CellValue::Error(gridkernel_common::ErrorKind::CyclicalReference)
            }
            Some(CellState::Dirty) | Some(CellState::Enqueued) => {
                self.cells.set_state(pos, CellState::Computing);
                let expr = self.cells.take_expr(pos).expect("state implies a live record");
                let pool = self.strings.take(pos);

                let value = {
                    let empty = crate::store::EmptyPool;
                    let pool_ref: &dyn StringPool = pool.as_deref().unwrap_or(&empty);
                    let mut ctx = EvalCtx { sheet: self };
                    match expr.evaluate(&mut ctx, pool_ref) {
                        Ok(v) => v,
                        Err(e) => CellValue::Error(e),
                    }
                };

                self.cells.restore_expr(pos, expr);
                if let Some(p) = pool {
                    self.strings.set(pos, p);
                }

                self.cells.set_value(pos, value.clone());
                self.cells.set_state(pos, CellState::UpToDate);
                self.enqueue_direct_dependents(pos);
                value
            }
        }
    }

    // ---- undo/redo (spec §4.7) -------------------------------------------

    pub fn end_undo_group(&mut self) {
        self.log.end_group();
    }

    #[tracing::instrument(skip(self))]
    pub fn undo(&mut self) -> Result<(), KernelError> {
        let entries = self.log.begin_undo();
        for entry in entries {
            self.apply_inverse(entry, LogSide::Redo)?;
        }
        self.log.finish_undo();
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn redo(&mut self) -> Result<(), KernelError> {
        let entries = self.log.begin_redo();
        for entry in entries {
            self.apply_inverse(entry, LogSide::Undo)?;
        }
        self.log.finish_redo();
        Ok(())
    }

    fn apply_inverse(&mut self, entry: UndoEntry, side: LogSide) -> Result<(), KernelError> {
        match entry {
            UndoEntry::SetCell { pos, handle } => {
                let archived = self.log.arena.take(handle);
                self.insert_on(pos, archived.expr, archived.pool, side, false)
            }
            UndoEntry::DeleteCell { pos } => self.delete_on(pos, side, false),
            UndoEntry::SetColumnWidth { col, old } => self.set_width_on(col, old, side, false),
            UndoEntry::SetColumnPrecision { col, old } => self.set_precision_on(col, old, side, false),
        }
    }
}

struct EvalCtx<'a> {
    sheet: &'a mut Sheet,
}

impl Resolver for EvalCtx<'_> {
    fn resolve(&mut self, pos: Position) -> CellValue {
        self.sheet.eval(pos)
    }

    fn live_positions(&self, range: Range) -> Vec<Position> {
        self.sheet.live_index.live_positions_in(&range)
    }
}

fn render_value(value: &CellValue, precision: u8) -> String {
    match value {
        CellValue::Number(n) => format!("{:.*}", precision as usize, n),
        CellValue::Text(s) => s.clone(),
        CellValue::Error(e) => e.to_string(),
        CellValue::Empty => String::new(),
    }
}
