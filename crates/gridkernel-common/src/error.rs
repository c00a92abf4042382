//! Error taxonomy shared across the kernel (spec §7).

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing or formatting a cell address.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum AddressError {
    #[error("invalid cell address")]
    InvalidCellAddress,
    #[error("cell address coordinate overflows the 16-bit coordinate space")]
    Overflow,
}

/// Errors a kernel mutation (insert/delete/set_width/...) can surface to its
/// caller. Per spec §5/§7 this is the *only* externally-visible failure mode
/// of a kernel mutation; on `OutOfMemory` the kernel state is left exactly as
/// it was before the call.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("allocation failed; kernel state unchanged")]
    OutOfMemory,
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// A value an expression can evaluate to, or the error it failed with. Errors
/// a resolver can surface are cached directly as a cell's value (spec §4.6,
/// §7) rather than aborting evaluation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Initial state of any cell never yet evaluated, or a cleared cell.
    NotEvaluable,
    /// Detected during evaluation: this cell participates in a dependency
    /// cycle.
    CyclicalReference,
    /// A `x/0`-shaped expression.
    DivisionByZero,
    /// An operator was applied to operands of incompatible kinds.
    TypeMismatch,
    /// A numeric computation exceeded the representable range.
    Overflow,
    /// A referenced cell address could not be resolved.
    InvalidCellAddress,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::NotEvaluable => "#NOTEVAL!",
            ErrorKind::CyclicalReference => "#CYCLE!",
            ErrorKind::DivisionByZero => "#DIV/0!",
            ErrorKind::TypeMismatch => "#TYPE!",
            ErrorKind::Overflow => "#OVERFLOW!",
            ErrorKind::InvalidCellAddress => "#REF!",
        })
    }
}
