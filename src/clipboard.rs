//! Clipboard codec (tab-separated text)
//!
//! Copy emits the format desktop spreadsheets put on the clipboard: cells
//! joined by `\t`, rows joined by `\n`. There is no quoting, so values that
//! themselves contain a tab or newline do not survive a copy/paste round trip.

use crate::models::{CellRange, CellRef, Grid, Row};

/// Serialize a rectangular range; cells outside the grid become `""`
pub fn serialize_range(grid: &Grid, range: CellRange) -> String {
    let (tl, br) = (range.top_left(), range.bottom_right());
    (tl.row..=br.row)
        .map(|r| {
            (tl.col..=br.col)
                .map(|c| grid.cell(r, c).unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split clipboard text into a string matrix.
///
/// Lines end at `\n`; a trailing `\r` from CRLF clipboards is dropped.
pub fn parse(text: &str) -> Vec<Row> {
    text.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.split('\t').map(str::to_string).collect()
        })
        .collect()
}

/// Drop one trailing `\n` or `\r\n`, as desktop spreadsheets end copied
/// text with a line break
pub fn strip_terminator(text: &str) -> &str {
    match text.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => text,
    }
}

/// Write `matrix` into the grid starting at `anchor`.
///
/// Rows are appended when the paste runs past the last row. Cells that fall
/// beyond the last column are dropped.
pub fn apply_paste(grid: &Grid, anchor: CellRef, matrix: &[Row]) -> Grid {
    let needed = anchor.row + matrix.len();
    let grown = grid.ensure_rows(needed);
    let column_count = grown.column_count();

    let writes = matrix.iter().enumerate().flat_map(|(i, row)| {
        row.iter()
            .enumerate()
            .filter(move |(j, _)| anchor.col + j < column_count)
            .map(move |(j, value)| (anchor.row + i, anchor.col + j, value.clone()))
    });
    grown.write_cells(writes)
}
