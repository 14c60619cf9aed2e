//! Grid session
//!
//! One session per bulk-entry workflow. It owns the grid, the column schema
//! and the edit state, runs events through the state machine, applies the
//! resulting effects in order and reports every committed mutation to the
//! injected `GridListener`. Validation is recomputed from scratch after each
//! mutation.

use serde::{Deserialize, Serialize};

use crate::clipboard;
use crate::config::GridConfig;
use crate::editor::{transition, EditState, Effect, GridContext, GridEvent};
use crate::error::Result;
use crate::models::{
    records_from_grid, seed_from_records, validate_all, CellRange, CellRef, Column, ColumnSchema,
    Grid, Row, RowRecord, ValidationError,
};

/// Receiver for grid notifications. Every method defaults to a no-op.
pub trait GridListener {
    /// After every committed mutation (cell edit, row add/delete, paste, column change)
    fn on_change(&mut self, _grid: &Grid) {}

    /// After a single-cell commit that changed the value
    fn on_cell_change(&mut self, _row: usize, _col: usize, _new_value: &str, _old_value: &str) {}

    fn on_row_add(&mut self, _index: usize, _row: &[String]) {}

    fn on_row_delete(&mut self, _index: usize, _row: &[String]) {}

    /// After every `on_change`, with the full recomputed error list
    fn on_validation_error(&mut self, _errors: &[ValidationError]) {}
}

pub struct NoopListener;

impl GridListener for NoopListener {}

/// What the host has to do after an event was handled
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub prevent_default: bool,
    /// Cell to focus once the new grid is rendered
    pub focus: Option<CellRef>,
    /// Text to write to the system clipboard
    pub clipboard: Option<String>,
    /// The grid was mutated
    pub changed: bool,
}

pub struct GridSession {
    grid: Grid,
    schema: ColumnSchema,
    min_rows: usize,
    max_displayed_errors: usize,
    state: EditState,
    errors: Vec<ValidationError>,
    listener: Box<dyn GridListener>,
}

impl GridSession {
    /// Start a session from config and seed rows.
    ///
    /// An empty seed starts with `defaultRows` rows; otherwise the seed is
    /// padded up to `minRows`.
    pub fn new(config: &GridConfig, seed: &[Row]) -> Result<Self> {
        config.check()?;
        let schema = config.schema()?;
        let rows = if seed.is_empty() { config.initial_rows() } else { config.min_rows };
        let grid = Grid::initialize(seed, schema.len(), rows);
        let errors = validate_all(&grid, &schema);
        log::debug!(
            "grid session started: {} rows x {} columns, {} errors",
            grid.row_count(),
            grid.column_count(),
            errors.len()
        );
        Ok(Self {
            grid,
            schema,
            min_rows: config.min_rows,
            max_displayed_errors: config.max_displayed_errors,
            state: EditState::Idle,
            errors,
            listener: Box::new(NoopListener),
        })
    }

    /// Start a session seeded from records keyed by column id.
    ///
    /// Records are laid out in the order given; keys the schema does not
    /// declare are rejected.
    pub fn from_records(config: &GridConfig, records: &[RowRecord]) -> Result<Self> {
        let schema = config.schema()?;
        let checked = records
            .iter()
            .map(|r| {
                RowRecord::from_pairs(
                    &schema,
                    r.row,
                    r.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(config, &seed_from_records(&checked, &schema))
    }

    pub fn with_listener(mut self, listener: Box<dyn GridListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn set_listener(&mut self, listener: Box<dyn GridListener>) {
        self.listener = listener;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut ColumnSchema {
        &mut self.schema
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The first `maxDisplayedErrors` errors, for listing next to the grid
    pub fn displayed_errors(&self) -> &[ValidationError] {
        &self.errors[..self.errors.len().min(self.max_displayed_errors)]
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Non-blank rows keyed by column id
    pub fn records(&self) -> Vec<RowRecord> {
        records_from_grid(&self.grid, &self.schema)
    }

    /// Run an event through the state machine and apply its effects
    pub fn dispatch(&mut self, event: GridEvent) -> DispatchOutcome {
        let next = transition(&self.state, &event, &GridContext::new(&self.grid, &self.schema));
        let mut outcome = DispatchOutcome::default();

        for effect in next.effects {
            match effect {
                Effect::Commit { cell, value } => outcome.changed |= self.update_cell(cell.row, cell.col, value),
                Effect::AppendRow => {
                    self.add_row();
                    outcome.changed = true;
                }
                Effect::Copy { range } => outcome.clipboard = Some(self.copy(range)),
                Effect::Focus { cell } => outcome.focus = Some(cell),
                Effect::PreventDefault => outcome.prevent_default = true,
            }
        }

        self.state = next.state;
        debug_assert!(
            self.state.selected().map_or(true, |c| self.grid.contains(c.row, c.col)),
            "state points outside the grid: {:?}",
            self.state
        );
        outcome
    }

    /// Write a value; returns whether anything changed.
    ///
    /// Unchanged values are a no-op: no callbacks and the grid snapshot is kept.
    pub fn update_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        let value = value.into();
        let Some(old) = self.grid.cell(row, col).map(str::to_string) else {
            debug_assert!(false, "update_cell({}, {}) out of bounds", row, col);
            return false;
        };
        if old == value {
            return false;
        }
        self.grid = self.grid.update_cell(row, col, value.clone());
        log::debug!("cell ({}, {}) changed", row, col);
        self.listener.on_cell_change(row, col, &value, &old);
        self.changed();
        true
    }

    /// Append an empty row and return its index
    pub fn add_row(&mut self) -> usize {
        self.grid = self.grid.add_row();
        let index = self.grid.row_count() - 1;
        if let Some(row) = self.grid.row(index) {
            self.listener.on_row_add(index, row);
        }
        self.changed();
        index
    }

    /// Delete a row; at the floor this is a silent no-op returning `false`
    pub fn delete_row(&mut self, row: usize) -> bool {
        let Some(removed) = self.grid.row(row).map(<[String]>::to_vec) else {
            return false;
        };
        let next = self.grid.delete_row(row, self.min_rows);
        if next.row_count() == self.grid.row_count() {
            return false;
        }
        self.grid = next;
        self.reconcile_state(Some(row));
        self.listener.on_row_delete(row, &removed);
        self.changed();
        true
    }

    /// Replace the column set, padding or truncating every row to fit.
    ///
    /// An open edit is closed without commit when its column changes type or
    /// becomes read-only.
    pub fn set_columns(&mut self, columns: Vec<Column>) -> Result<()> {
        let schema = ColumnSchema::new(columns)?;
        if let Some(cell) = self.state.editing() {
            let same_editor = match (self.schema.get(cell.col), schema.get(cell.col)) {
                (Some(old), Some(new)) => {
                    old.column_type == new.column_type && old.read_only == new.read_only
                }
                _ => false,
            };
            if !same_editor {
                self.state = EditState::Selected { cell };
            }
        }
        let resized = self.grid.resize_columns(schema.len());
        let reshaped = resized.column_count() != self.grid.column_count();
        self.grid = resized;
        self.schema = schema;
        self.reconcile_state(None);
        if reshaped {
            self.changed();
        } else {
            // Same width, but rules may differ
            self.refresh_validation();
        }
        Ok(())
    }

    /// Serialize a range as tab-separated text
    pub fn copy(&self, range: CellRange) -> String {
        clipboard::serialize_range(&self.grid, range)
    }

    pub fn copy_selection(&self) -> Option<String> {
        self.state.selected().map(|cell| self.copy(CellRange::single(cell)))
    }

    /// Paste tab-separated text with its top-left corner at `anchor`.
    ///
    /// Rows are appended as needed; columns past the last one are dropped.
    /// The line break spreadsheets append to copied text is not a row.
    pub fn paste_at(&mut self, anchor: CellRef, text: &str) -> bool {
        let text = clipboard::strip_terminator(text);
        if text.is_empty() || !self.grid.contains(anchor.row, anchor.col) {
            return false;
        }
        let matrix = clipboard::parse(text);
        let before = self.grid.row_count();
        let next = clipboard::apply_paste(&self.grid, anchor, &matrix);
        if next == self.grid {
            return false;
        }
        self.grid = next;
        for index in before..self.grid.row_count() {
            if let Some(row) = self.grid.row(index) {
                self.listener.on_row_add(index, row);
            }
        }
        log::debug!(
            "pasted {} rows at ({}, {})",
            matrix.len(),
            anchor.row,
            anchor.col
        );
        self.changed();
        true
    }

    /// Paste at the selected cell. While editing, paste belongs to the editor.
    pub fn paste(&mut self, text: &str) -> bool {
        match self.state {
            EditState::Selected { cell } => self.paste_at(cell, text),
            _ => false,
        }
    }

    /// Re-run validation, e.g. after a custom rule was attached
    pub fn refresh_validation(&mut self) {
        self.errors = validate_all(&self.grid, &self.schema);
        self.listener.on_validation_error(&self.errors);
    }

    fn changed(&mut self) {
        self.listener.on_change(&self.grid);
        self.refresh_validation();
    }

    /// Keep the selection inside the grid after a shape change.
    /// An open edit follows its row when rows above it are deleted; an edit
    /// on a deleted row is discarded.
    fn reconcile_state(&mut self, deleted_row: Option<usize>) {
        let (rows, cols) = (self.grid.row_count(), self.grid.column_count());
        let Some(cell) = self.state.selected() else {
            return;
        };
        if rows == 0 || cols == 0 {
            self.state = EditState::Idle;
            return;
        }
        let mut row = cell.row;
        if let Some(deleted) = deleted_row {
            if deleted < row {
                row -= 1;
            }
        }
        let shifted = CellRef::new(row, cell.col);
        let clamped = CellRef::new(row.min(rows - 1), cell.col.min(cols - 1));
        let edited_row_deleted = deleted_row == Some(cell.row);

        self.state = match &self.state {
            EditState::Editing { draft, original, composing, .. }
                if clamped == shifted && !edited_row_deleted =>
            {
                EditState::Editing {
                    cell: shifted,
                    draft: draft.clone(),
                    original: original.clone(),
                    composing: *composing,
                }
            }
            _ => EditState::Selected { cell: clamped },
        };
    }
}
