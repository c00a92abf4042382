//! The six literal end-to-end scenarios from spec §8, run against `Sheet`
//! with `gridkernel-expr` as the expression collaborator.

use gridkernel_common::{CellValue, ErrorKind, Position};
use gridkernel_core::Sheet;

fn set(sheet: &mut Sheet, pos: Position, text: &str) {
    let (expr, pool) = gridkernel_expr::parse(text).expect("test formula parses");
    sheet.insert(pos, Box::new(expr), Box::new(pool)).expect("insert succeeds");
}

fn num(sheet: &Sheet, pos: Position) -> f64 {
    match sheet.cell_at(pos) {
        Some(CellValue::Number(n)) => n,
        other => panic!("expected a number at {pos}, got {other:?}"),
    }
}

#[test]
fn s1_dependency_chain() {
    let mut sheet = Sheet::new();
    set(&mut sheet, Position::new(0, 0), "1");
    for row in 1..=9 {
        let text = format!("{} + 1", Position::new(0, row - 1));
        set(&mut sheet, Position::new(0, row), &text);
    }
    sheet.update();
    assert_eq!(num(&sheet, Position::new(0, 9)), 10.0);

    set(&mut sheet, Position::new(0, 0), "5");
    sheet.update();
    assert_eq!(num(&sheet, Position::new(0, 9)), 14.0);
}

#[test]
fn s2_cycle_detection() {
    let mut sheet = Sheet::new();
    set(&mut sheet, Position::new(0, 0), "B0");
    set(&mut sheet, Position::new(1, 0), "A0");
    sheet.update();

    assert_eq!(
        sheet.cell_at(Position::new(0, 0)),
        Some(CellValue::Error(ErrorKind::CyclicalReference))
    );
    assert_eq!(
        sheet.cell_at(Position::new(1, 0)),
        Some(CellValue::Error(ErrorKind::CyclicalReference))
    );
}

fn load_s3(sheet: &mut Sheet) {
    for (row, v) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
        set(sheet, Position::new(0, row as u16), &v.to_string());
    }
    set(sheet, Position::new(1, 0), "@sum(A0:A4)");
    sheet.update();
}

#[test]
fn s3_range_sum() {
    let mut sheet = Sheet::new();
    load_s3(&mut sheet);
    assert_eq!(num(&sheet, Position::new(1, 0)), 15.0);

    set(&mut sheet, Position::new(0, 2), "30");
    sheet.update();
    assert_eq!(num(&sheet, Position::new(1, 0)), 43.0);
}

#[test]
fn s4_delete_restores_dependents_via_undo() {
    let mut sheet = Sheet::new();
    load_s3(&mut sheet);
    set(&mut sheet, Position::new(0, 2), "30");
    sheet.update();
    assert_eq!(num(&sheet, Position::new(1, 0)), 43.0);
    sheet.end_undo_group();

    sheet.delete(Position::new(0, 2)).unwrap();
    sheet.update();
    assert_eq!(num(&sheet, Position::new(1, 0)), 13.0);

    sheet.undo().unwrap();
    sheet.update();
    assert_eq!(num(&sheet, Position::new(1, 0)), 43.0);
}

#[test]
fn s5_deep_chain_grid_is_consistent() {
    let mut sheet = Sheet::new();
    const COLS: u16 = 8;
    const ROWS: u16 = 21;
    for row in 0..ROWS {
        for col in 0..COLS {
            let left = if col > 0 { Position::new(col - 1, row).to_string() } else { "0".into() };
            let top = if row > 0 { Position::new(col, row - 1).to_string() } else { "0".into() };
            set(&mut sheet, Position::new(col, row), &format!("{left} + {top} + 1"));
        }
    }
    let start = std::time::Instant::now();
    sheet.update();
    assert!(start.elapsed().as_millis() < 100, "S5 must complete within the 100ms detail floor");

    // Closed form for this recurrence (f(c,r) = f(c-1,r) + f(c,r-1) + 1,
    // zero out of bounds): f(c, r) = C(c + r + 2, c + 1) - 1.
    fn binomial(n: u64, k: u64) -> u64 {
        if k > n {
            return 0;
        }
        let mut result = 1u64;
        for i in 0..k.min(n - k) {
            result = result * (n - i) / (i + 1);
        }
        result
    }
    for row in 0..ROWS {
        for col in 0..COLS {
            let expected = binomial((col + row + 2) as u64, (col + 1) as u64) as f64 - 1.0;
            assert_eq!(num(&sheet, Position::new(col, row)), expected);
        }
    }
}

#[test]
fn s6_spatial_dependency_is_scoped_to_intersecting_cells() {
    let mut sheet = Sheet::new();
    // Three sums over disjoint-ish ranges, mirroring S6's three rectangles.
    for row in 1..=3u16 {
        for col in 1..=3u16 {
            set(&mut sheet, Position::new(col, row), "1");
        }
    }
    for row in 5..=10u16 {
        for col in 5..=10u16 {
            set(&mut sheet, Position::new(col, row), "1");
        }
    }
    set(&mut sheet, Position::new(20, 20), "@sum(A1:C3)");
    set(&mut sheet, Position::new(21, 20), "@sum(E5:J10)");
    sheet.update();

    assert_eq!(num(&sheet, Position::new(20, 20)), 9.0);
    assert_eq!(num(&sheet, Position::new(21, 20)), 36.0);

    // A change inside the first rectangle must only dirty the first sum.
    set(&mut sheet, Position::new(2, 2), "100");
    sheet.update();
    assert_eq!(num(&sheet, Position::new(20, 20)), 108.0);
    assert_eq!(num(&sheet, Position::new(21, 20)), 36.0);
}

#[test]
fn invariant_4_no_cell_left_pending_after_update() {
    let mut sheet = Sheet::new();
    load_s3(&mut sheet);
    // If any cell were left dirty/enqueued/computing, a second `update()`
    // with nothing newly inserted would still re-run it and change nothing
    // observable; the real assertion is that values are already settled
    // immediately after the first `update()` inside `load_s3`.
    assert_eq!(num(&sheet, Position::new(1, 0)), 15.0);
    sheet.update();
    assert_eq!(num(&sheet, Position::new(1, 0)), 15.0);
}

#[test]
fn invariant_6_undo_then_redo_is_identity_on_visible_state() {
    let mut sheet = Sheet::new();
    load_s3(&mut sheet);
    sheet.end_undo_group();
    let before = (0..5)
        .map(|row| sheet.cell_at(Position::new(0, row)))
        .chain(std::iter::once(sheet.cell_at(Position::new(1, 0))))
        .collect::<Vec<_>>();

    set(&mut sheet, Position::new(0, 2), "30");
    sheet.update();
    sheet.end_undo_group();
    assert_eq!(num(&sheet, Position::new(1, 0)), 43.0);

    sheet.undo().unwrap();
    sheet.update();
    sheet.redo().unwrap();
    sheet.update();

    let after = (0..5)
        .map(|row| sheet.cell_at(Position::new(0, row)))
        .chain(std::iter::once(sheet.cell_at(Position::new(1, 0))))
        .collect::<Vec<_>>();
    assert_ne!(before, after, "the redo'd edit must still be visible");
    assert_eq!(num(&sheet, Position::new(0, 2)), 30.0);
    assert_eq!(num(&sheet, Position::new(1, 0)), 43.0);
}

#[test]
fn invariant_5_undo_redo_logs_end_with_group_terminators() {
    let mut sheet = Sheet::new();
    set(&mut sheet, Position::new(0, 0), "1");
    sheet.end_undo_group();
    sheet.undo().unwrap();
    sheet.redo().unwrap();
    // A third undo must still find a well-formed, singly-grouped log.
    sheet.undo().unwrap();
    assert_eq!(sheet.cell_at(Position::new(0, 0)), None);
}
