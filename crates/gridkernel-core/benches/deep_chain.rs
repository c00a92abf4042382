//! S5 — deep chain performance (spec §8): a fully populated 8x21 grid where
//! each cell is the sum of its top and left neighbor plus 1. A single
//! `update()` over the whole grid must complete well under the spec's
//! 100ms detail floor on commodity hardware.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gridkernel_core::{Position, Sheet};

const COLS: u16 = 8;
const ROWS: u16 = 21;

fn build_unevaluated_grid() -> Sheet {
    let mut sheet = Sheet::new();
    for row in 0..ROWS {
        for col in 0..COLS {
            let left = if col > 0 {
                Position::new(col - 1, row).to_string()
            } else {
                "0".to_string()
            };
            let top = if row > 0 {
                Position::new(col, row - 1).to_string()
            } else {
                "0".to_string()
            };
            let text = format!("{left} + {top} + 1");
            let (expr, pool) = gridkernel_expr::parse(&text).expect("grid formula parses");
            sheet
                .insert(Position::new(col, row), Box::new(expr), Box::new(pool))
                .expect("grid insert succeeds");
        }
    }
    sheet
}

fn bench_deep_chain(c: &mut Criterion) {
    c.bench_function("deep_chain/full_grid_update", |b| {
        b.iter_batched(build_unevaluated_grid, |mut sheet| sheet.update(), BatchSize::SmallInput)
    });
}

criterion_group!(benches, bench_deep_chain);
criterion_main!(benches);
