//! Shared types for the WASM API
//!
//! This module contains result types returned to JavaScript.

use crate::editor::EditState;
use crate::models::{CellRef, Column, ValidationError};
use crate::session::{DispatchOutcome, GridSession};

/// Full render snapshot of a grid session
#[derive(serde::Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    pub rows: Vec<Vec<String>>,
    pub columns: Vec<Column>,
    pub state: EditState,
    pub errors: Vec<ValidationError>,
    /// Errors to list, already truncated
    pub displayed_errors: Vec<ValidationError>,
    pub min_rows: usize,
}

impl GridSnapshot {
    pub fn of(session: &GridSession) -> Self {
        Self {
            rows: session.grid().to_matrix(),
            columns: session.schema().columns().to_vec(),
            state: session.state().clone(),
            errors: session.errors().to_vec(),
            displayed_errors: session.displayed_errors().to_vec(),
            min_rows: session.min_rows(),
        }
    }
}

/// Result of an event handled by the grid
#[derive(serde::Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventResult {
    pub prevent_default: bool,
    pub focus: Option<CellRef>,
    pub clipboard: Option<String>,
    pub changed: bool,
    pub state: EditState,
}

impl EventResult {
    pub fn new(outcome: DispatchOutcome, state: &EditState) -> Self {
        Self {
            prevent_default: outcome.prevent_default,
            focus: outcome.focus,
            clipboard: outcome.clipboard,
            changed: outcome.changed,
            state: state.clone(),
        }
    }
}
