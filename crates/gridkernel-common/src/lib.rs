//! Shared position, range, value, error, and expression-boundary types for
//! the gridkernel spreadsheet kernel.
//!
//! This crate has no dependency on the rest of the workspace: it is the leaf
//! layer every other `gridkernel-*` crate builds on.

pub mod error;
pub mod expr;
pub mod position;
pub mod range;
pub mod value;

pub use error::{AddressError, KernelError};
pub use error::ErrorKind;
pub use expr::{Expr, Resolver, StringHandle, StringPool};
pub use position::{parse_position, Position};
pub use range::Range;
pub use value::CellValue;
