//! Grid data model
//!
//! A rectangular matrix of strings with copy-on-write rows. Every operation
//! takes `&self` and returns a new `Grid`; rows that were not touched keep
//! sharing storage with the previous snapshot, so a consumer can tell which
//! rows changed with `Arc::ptr_eq` and readers never see a half-applied edit.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

pub type Row = Vec<String>;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Grid {
    rows: Vec<Arc<Row>>,
    column_count: usize,
}

impl Grid {
    /// Build a grid from seed rows.
    ///
    /// Produces `max(seed.len(), min_rows)` rows of exactly `column_count`
    /// cells; missing seed cells become `""` and extra seed cells are dropped.
    pub fn initialize(seed: &[Row], column_count: usize, min_rows: usize) -> Self {
        let row_count = seed.len().max(min_rows);
        let rows = (0..row_count)
            .map(|r| {
                let src = seed.get(r);
                Arc::new(
                    (0..column_count)
                        .map(|c| src.and_then(|row| row.get(c)).cloned().unwrap_or_default())
                        .collect(),
                )
            })
            .collect();
        Self { rows, column_count }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(|s| s.as_str())
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows.len() && col < self.column_count
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// A row is blank when every cell is empty after trimming
    pub fn is_row_blank(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |r| r.iter().all(|v| v.trim().is_empty()))
    }

    /// Whether row `row` of both grids is the same allocation
    pub fn shares_row(&self, other: &Grid, row: usize) -> bool {
        match (self.rows.get(row), other.rows.get(row)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Plain owned copy of the data, for handing to the host
    pub fn to_matrix(&self) -> Vec<Row> {
        self.rows.iter().map(|r| r.as_ref().clone()).collect()
    }

    /// Return a grid with exactly one cell changed
    pub fn update_cell(&self, row: usize, col: usize, value: impl Into<String>) -> Self {
        debug_assert!(self.contains(row, col), "update_cell({}, {}) out of bounds", row, col);
        let mut next = self.clone();
        if let Some(cell) = next.rows.get_mut(row).and_then(|r| Arc::make_mut(r).get_mut(col)) {
            *cell = value.into();
        }
        next
    }

    /// Append one row of empty strings
    pub fn add_row(&self) -> Self {
        let mut next = self.clone();
        next.rows.push(Arc::new(vec![String::new(); self.column_count]));
        next
    }

    /// Remove a row unless that would take the grid below `min_rows`
    pub fn delete_row(&self, row: usize, min_rows: usize) -> Self {
        if self.rows.len() <= min_rows {
            return self.clone();
        }
        debug_assert!(row < self.rows.len(), "delete_row({}) out of bounds", row);
        let mut next = self.clone();
        if row < next.rows.len() {
            next.rows.remove(row);
        }
        next
    }

    /// Pad or truncate every row to `column_count` cells
    pub fn resize_columns(&self, column_count: usize) -> Self {
        if column_count == self.column_count {
            return self.clone();
        }
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut row = r.as_ref().clone();
                row.resize(column_count, String::new());
                Arc::new(row)
            })
            .collect();
        Self { rows, column_count }
    }

    /// Append empty rows until the grid has at least `row_count` rows
    pub fn ensure_rows(&self, row_count: usize) -> Self {
        let mut next = self.clone();
        while next.rows.len() < row_count {
            next.rows.push(Arc::new(vec![String::new(); self.column_count]));
        }
        next
    }

    /// Write several cells in one copy. Out-of-bounds writes are skipped.
    pub(crate) fn write_cells<I>(&self, writes: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, String)>,
    {
        let mut next = self.clone();
        for (row, col, value) in writes {
            if col >= next.column_count {
                continue;
            }
            if let Some(cell) = next.rows.get_mut(row).and_then(|r| Arc::make_mut(r).get_mut(col)) {
                *cell = value;
            }
        }
        next
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row.as_ref())?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Vec<Row> {
        vec![
            vec!["shoes".into(), "https://a.example".into()],
            vec!["boots".into()],
        ]
    }

    #[test]
    fn test_initialize_pads_to_min_rows_and_columns() {
        let grid = Grid::initialize(&seed(), 3, 4);
        assert_eq!(grid.row_count(), 4);
        assert!(grid.rows().all(|r| r.len() == 3));
        assert_eq!(grid.cell(1, 0), Some("boots"));
        assert_eq!(grid.cell(1, 1), Some(""));
        assert_eq!(grid.cell(3, 2), Some(""));
    }

    #[test]
    fn test_initialize_drops_extra_seed_cells() {
        let grid = Grid::initialize(&seed(), 1, 1);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.row(0), Some(&["shoes".to_string()][..]));
    }

    #[test]
    fn test_update_cell_is_copy_on_write() {
        let grid = Grid::initialize(&seed(), 2, 2);
        let next = grid.update_cell(0, 1, "https://b.example");

        assert_eq!(grid.cell(0, 1), Some("https://a.example"));
        assert_eq!(next.cell(0, 1), Some("https://b.example"));
        assert!(!next.shares_row(&grid, 0));
        assert!(next.shares_row(&grid, 1));
    }

    #[test]
    fn test_delete_row_respects_floor() {
        let grid = Grid::initialize(&seed(), 2, 2);
        let same = grid.delete_row(0, 2);
        assert_eq!(same, grid);

        let grown = grid.add_row();
        let shrunk = grown.delete_row(0, 2);
        assert_eq!(shrunk.row_count(), 2);
        assert_eq!(shrunk.cell(0, 0), Some("boots"));
    }

    #[test]
    fn test_resize_columns_pads_and_truncates() {
        let grid = Grid::initialize(&seed(), 2, 2);
        let wide = grid.resize_columns(4);
        assert!(wide.rows().all(|r| r.len() == 4));
        assert_eq!(wide.column_count(), 4);

        let narrow = wide.resize_columns(1);
        assert!(narrow.rows().all(|r| r.len() == 1));
        assert_eq!(narrow.cell(0, 0), Some("shoes"));
    }

    #[test]
    fn test_row_floor_holds_for_any_delete_sequence() {
        let mut grid = Grid::initialize(&[], 2, 3).add_row().add_row();
        for row in [0, 4, 1, 0, 0, 2, 0] {
            let target = row.min(grid.row_count() - 1);
            grid = grid.delete_row(target, 3);
            assert!(grid.row_count() >= 3);
        }
    }

    #[test]
    fn test_serializes_as_matrix() {
        let grid = Grid::initialize(&seed(), 2, 1);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"[["shoes","https://a.example"],["boots",""]]"#);
    }
}
