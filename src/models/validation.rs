//! Validation engine
//!
//! Stateless: the error list is a pure function of the grid and the schema and
//! is recomputed from scratch after every change.

use serde::{Deserialize, Serialize};

use super::column::{Column, ColumnSchema};
use super::grid::Grid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub row: usize,
    pub col: usize,
    pub column_id: String,
    pub message: String,
    pub value: String,
}

/// Validate one cell value against its column
pub fn validate_cell(row: usize, col: usize, value: &str, column: &Column) -> Option<ValidationError> {
    column.validate(value).map(|message| ValidationError {
        row,
        col,
        column_id: column.id.clone(),
        message,
        value: value.to_string(),
    })
}

/// Validate every non-blank row, in row-major then column-major order.
///
/// Fully blank rows are skipped so optional trailing rows never report
/// required-field errors.
pub fn validate_all(grid: &Grid, schema: &ColumnSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (r, row) in grid.rows().enumerate() {
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        for (c, column) in schema.columns().iter().enumerate() {
            let value = row.get(c).map(String::as_str).unwrap_or("");
            if let Some(err) = validate_cell(r, c, value, column) {
                errors.push(err);
            }
        }
    }
    errors
}
