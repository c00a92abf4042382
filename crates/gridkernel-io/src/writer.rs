//! The persisted-format writer, the supplemented counterpart to
//! [`crate::reader`] that lets a saved sheet round-trip back through it.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use gridkernel_core::Sheet;

use crate::error::IoError;

/// Write every populated cell in `sheet`'s canonical order as one
/// `let`/`label` statement per line. A cell whose rendered expression is a
/// bare string literal is written with `label`; everything else with `let`.
pub fn save_into(sheet: &Sheet, mut dest: impl Write) -> Result<(), IoError> {
    for pos in sheet.ordered_positions() {
        let Some(text) = sheet.expression_text(pos) else {
            continue;
        };
        let keyword = if text.starts_with('"') { "label" } else { "let" };
        writeln!(dest, "{keyword} {pos} = {text}")?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write `sheet` into it.
pub fn save_file(sheet: &Sheet, path: impl AsRef<Path>) -> Result<(), IoError> {
    save_into(sheet, File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::load_into;
    use gridkernel_common::Position;

    #[test]
    fn round_trips_through_load() {
        let mut sheet = Sheet::new();
        load_into(&mut sheet, "let A0 = 1 + 2\nlabel B0 = \"hi\"\n".as_bytes()).unwrap();
        sheet.update();

        let mut buf = Vec::new();
        save_into(&sheet, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut reloaded = Sheet::new();
        load_into(&mut reloaded, text.as_bytes()).unwrap();
        reloaded.update();

        assert_eq!(reloaded.cell_at(Position::new(0, 0)), sheet.cell_at(Position::new(0, 0)));
        assert_eq!(reloaded.cell_at(Position::new(1, 0)), sheet.cell_at(Position::new(1, 0)));
    }
}
