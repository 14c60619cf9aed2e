//! Cell references and rectangular ranges

use serde::{Deserialize, Serialize};

/// A position in the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn origin() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// A rectangle given by two corners in any order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    pub fn single(cell: CellRef) -> Self {
        Self { start: cell, end: cell }
    }

    /// Top-left corner after normalizing both axes
    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.start.row.min(self.end.row), self.start.col.min(self.end.col))
    }

    /// Bottom-right corner (inclusive) after normalizing both axes
    pub fn bottom_right(&self) -> CellRef {
        CellRef::new(self.start.row.max(self.end.row), self.start.col.max(self.end.col))
    }

    pub fn row_count(&self) -> usize {
        self.bottom_right().row - self.top_left().row + 1
    }

    pub fn col_count(&self) -> usize {
        self.bottom_right().col - self.top_left().col + 1
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        let (tl, br) = (self.top_left(), self.bottom_right());
        (tl.row..=br.row).contains(&cell.row) && (tl.col..=br.col).contains(&cell.col)
    }
}
