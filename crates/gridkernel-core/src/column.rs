//! Per-column display metadata (spec §3 "Column metadata").

use rustc_hash::FxHashMap;

/// Display width (in characters, `>= 1`) and decimal precision for a column.
/// Columns not present in the map behave as the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMeta {
    pub width: u16,
    pub precision: u8,
}

impl Default for ColumnMeta {
    fn default() -> Self {
        Self { width: 10, precision: 2 }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ColumnMap {
    meta: FxHashMap<u16, ColumnMeta>,
}

impl ColumnMap {
    pub(crate) fn get(&self, col: u16) -> ColumnMeta {
        self.meta.get(&col).copied().unwrap_or_default()
    }

    pub(crate) fn set_width(&mut self, col: u16, width: u16) {
        let width = width.max(1);
        self.meta.entry(col).or_default().width = width;
    }

    pub(crate) fn set_precision(&mut self, col: u16, precision: u8) {
        self.meta.entry(col).or_default().precision = precision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_column_is_default() {
        let cols = ColumnMap::default();
        assert_eq!(cols.get(3), ColumnMeta { width: 10, precision: 2 });
    }

    #[test]
    fn set_width_is_clamped_to_at_least_one() {
        let mut cols = ColumnMap::default();
        cols.set_width(0, 0);
        assert_eq!(cols.get(0).width, 1);
    }

    #[test]
    fn set_width_and_precision_are_independent() {
        let mut cols = ColumnMap::default();
        cols.set_width(2, 15);
        assert_eq!(cols.get(2), ColumnMeta { width: 15, precision: 2 });
        cols.set_precision(2, 4);
        assert_eq!(cols.get(2), ColumnMeta { width: 15, precision: 4 });
    }
}
