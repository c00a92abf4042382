//! The expression-tree *collaborator* boundary (spec §4.4, §6).
//!
//! The kernel never inspects node internals; it only calls through this
//! trait. `gridkernel-expr` is the concrete implementation that satisfies it;
//! any other parser/evaluator could be swapped in without the kernel crate
//! changing.

use std::fmt;

use crate::error::ErrorKind;
use crate::position::Position;
use crate::range::Range;
use crate::value::CellValue;

/// Handle into a cell's out-of-line string storage (spec §3, §4.5). The
/// kernel's cell store owns the actual string bytes, keyed by cell position;
/// an expression only carries handles, never owned string data, so that
/// re-parenting an expression (undo/redo archiving) never copies string
/// bytes.
pub type StringHandle = u32;

/// Side-channel that resolves a [`StringHandle`] back to text, supplied by
/// the cell store to an expression's `print` method.
pub trait StringPool {
    fn get(&self, handle: StringHandle) -> &str;
}

/// A resolver a context can use to evaluate a referenced position. Only the
/// evaluation engine implements this (as an adapter over the cell store);
/// recursing through `resolve` is how `eval(pos)` reaches its dependencies.
pub trait Resolver {
    fn resolve(&mut self, pos: Position) -> CellValue;

    /// Every currently-live position contained in `range`, via the live-cell
    /// index. Range-shaped operations (e.g. `@sum`) walk this instead of
    /// every position the range spans, so a reference like `A0:ZZ65535`
    /// stays cheap even though the range itself is huge.
    fn live_positions(&self, range: Range) -> Vec<Position>;
}

/// An immutable, opaque post-order expression tree, as produced by a parser
/// external to the kernel.
pub trait Expr: fmt::Debug {
    /// Every range this expression references. A single-cell reference `p`
    /// yields `Range::single(p)`; a range reference `p1:p2` yields
    /// `Range::new(p1, p2)`.
    fn referenced_ranges(&self) -> Vec<Range>;

    /// Evaluate this expression, resolving other cells through `ctx` and any
    /// out-of-line string literals through `pool` (spec §5: the parsed
    /// string pool for a cell is owned by the parallel string map, not by
    /// the expression tree itself).
    fn evaluate(&self, ctx: &mut dyn Resolver, pool: &dyn StringPool) -> Result<CellValue, ErrorKind>;

    /// Serialize this expression back to source text, resolving any
    /// out-of-line string literals through `pool`.
    fn print(&self, out: &mut dyn fmt::Write, pool: &dyn StringPool) -> fmt::Result;
}
