//! Parse-time errors. These are surfaced to the front-end command layer
//! (spec §7), never cached as a cell's value — only evaluator errors are.

use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character '{0}' at byte {1}")]
    UnexpectedChar(char, usize),
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: &'static str, found: String },
    #[error("unknown function '@{0}'")]
    UnknownFunction(String),
    #[error("invalid cell address '{0}'")]
    InvalidAddress(String),
    #[error("trailing input after a complete expression")]
    TrailingInput,
}
