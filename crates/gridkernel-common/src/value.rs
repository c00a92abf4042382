//! The cached-value tag every cell record carries (spec §3).

use std::fmt;

use crate::error::ErrorKind;

/// The cached value of a cell, tagged as one of `{number, string, error}`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(ErrorKind),
    /// No cell exists at the resolved position. Distinct from any cached
    /// value a real cell can hold; aggregate functions treat it as `0`
    /// (numeric context) or `""` (text context), matching how blank cells
    /// behave in arithmetic elsewhere in this class of kernel.
    Empty,
}

impl CellValue {
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Empty => Some(0.0),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Error(e) => write!(f, "{e}"),
            CellValue::Empty => write!(f, ""),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Error(ErrorKind::NotEvaluable)
    }
}
