//! The persisted-format loader (spec §6): one `let`/`label` statement per
//! non-empty line, permissively skipping anything that fails to parse.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use gridkernel_common::parse_position;
use gridkernel_core::Sheet;

use crate::error::IoError;

struct Statement<'a> {
    pos_text: &'a str,
    expr_text: &'a str,
}

fn parse_statement(line: &str) -> Option<Statement<'_>> {
    let rest = line.strip_prefix("let ").or_else(|| line.strip_prefix("label "))?;
    let (pos_text, expr_text) = rest.split_once('=')?;
    Some(Statement {
        pos_text: pos_text.trim(),
        expr_text: expr_text.trim(),
    })
}

/// Read `source` line by line, inserting every well-formed `let`/`label`
/// statement into `sheet`. Neither an unparseable position, an unparseable
/// expression, nor a line matching neither keyword aborts the load; only an
/// I/O error or a kernel allocation failure does.
pub fn load_into(sheet: &mut Sheet, source: impl Read) -> Result<(), IoError> {
    let reader = BufReader::new(source);
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(stmt) = parse_statement(line) else {
            tracing::debug!(%line, "skipping unparseable statement");
            continue;
        };
        let Ok(pos) = parse_position(stmt.pos_text) else {
            tracing::debug!(pos = stmt.pos_text, "skipping unparseable address");
            continue;
        };
        let Ok((expr, pool)) = gridkernel_expr::parse(stmt.expr_text) else {
            tracing::debug!(expr = stmt.expr_text, "skipping unparseable expression");
            continue;
        };
        sheet.insert(pos, Box::new(expr), Box::new(pool))?;
    }
    Ok(())
}

/// Open `path` and load it into `sheet`.
pub fn load_file(sheet: &mut Sheet, path: impl AsRef<Path>) -> Result<(), IoError> {
    load_into(sheet, File::open(path)?)
}
