//! The spreadsheet kernel: an ordered cell store, a spatial dependency
//! graph, grouped undo/redo, and an incremental evaluation engine, wired
//! together behind a single [`Sheet`] handle.
//!
//! Expression parsing and evaluation are deliberately out of scope here;
//! `Sheet` only ever calls through the [`gridkernel_common::Expr`] /
//! [`gridkernel_common::Resolver`] boundary, so any parser satisfying that
//! trait (e.g. `gridkernel-expr`) can sit in front of it.

mod cell;
mod column;
mod sheet;
mod store;
mod undo;

pub use column::ColumnMeta;
pub use gridkernel_common::{CellValue, Expr, KernelError, Position, Range, StringPool};
pub use sheet::Sheet;
