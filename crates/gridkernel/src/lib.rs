//! Meta crate re-exporting gridkernel's layers under one dependency. No TUI,
//! no key mapping, no CLI argument parsing live here — those are
//! collaborators outside this workspace's scope.

pub use gridkernel_common as common;
pub use gridkernel_core as core;
pub use gridkernel_expr as expr;
pub use gridkernel_io as io;
pub use gridkernel_rtree as rtree;

pub use gridkernel_common::{CellValue, ErrorKind, Expr, KernelError, Position, Range, StringPool};
pub use gridkernel_core::{ColumnMeta, Sheet};
