//! A single cell record: expression, cached value, and evaluation state
//! (spec §3 "Cell record").

use gridkernel_common::{CellValue, Expr};

/// The four phases of a cell's evaluation lifecycle (spec GLOSSARY).
///
/// A cell in `UpToDate` holds a cached value consistent with its expression
/// under the current snapshot of every other cell. `Computing` is only ever
/// set during the single evaluation pass currently on the call stack; it is
/// the sole guard against runaway recursion through a dependency cycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellState {
    UpToDate = 0,
    Dirty = 1,
    Enqueued = 2,
    Computing = 3,
}

/// A cell's expression is temporarily removed from the record while it is
/// being evaluated, so the engine can hold `&mut Sheet` for recursive
/// `resolve` calls without an overlapping borrow on this cell's own storage.
/// `None` outside of an in-flight `eval` call is a bug, never a steady-state
/// value. The cell's out-of-line string literals live in the parallel
/// [`crate::store::StringMap`], not here (spec §3/§5).
pub(crate) struct CellRecord {
    pub(crate) expr: Option<Box<dyn Expr>>,
    pub(crate) value: CellValue,
    pub(crate) state: CellState,
}

impl CellRecord {
    pub(crate) fn new(expr: Box<dyn Expr>) -> Self {
        Self {
            expr: Some(expr),
            value: CellValue::default(),
            state: CellState::Dirty,
        }
    }
}
