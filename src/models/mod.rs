//! Models module for the bulk-entry grid
//!
//! This module contains the data models of the grid: the column schema,
//! the cell matrix, cell references, validation results and row records.

pub mod column;
pub mod grid;
pub mod record;
pub mod selection;
pub mod validation;

// Re-export commonly used types
pub use column::{Column, ColumnSchema, ColumnType, CustomRule, ValidationRule};
pub use grid::{Grid, Row};
pub use record::{records_from_grid, seed_from_records, RowRecord};
pub use selection::{CellRange, CellRef};
pub use validation::{validate_all, validate_cell, ValidationError};
