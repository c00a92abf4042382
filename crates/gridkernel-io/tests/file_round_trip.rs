use gridkernel_common::{CellValue, Position};
use gridkernel_core::Sheet;
use gridkernel_io::{load_file, save_file};

#[test]
fn save_then_load_file_preserves_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.txt");

    let mut sheet = Sheet::new();
    sheet
        .insert(
            Position::new(0, 0),
            Box::new(gridkernel_expr::parse("10 / 2").unwrap().0),
            Box::new(gridkernel_expr::parse("10 / 2").unwrap().1),
        )
        .unwrap();
    sheet.update();

    save_file(&sheet, &path).unwrap();

    let mut reloaded = Sheet::new();
    load_file(&mut reloaded, &path).unwrap();
    reloaded.update();

    assert_eq!(reloaded.cell_at(Position::new(0, 0)), Some(CellValue::Number(5.0)));
}
