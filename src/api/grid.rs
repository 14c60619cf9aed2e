//! JavaScript-facing grid handle
//!
//! `BulkGrid` wraps one `GridSession`. The view layer forwards DOM events to
//! it and renders from the returned state; notifications go back to JS
//! through the callbacks registered with `setCallbacks`.

use std::collections::BTreeMap;

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::api::helpers::{self, deserialize, grid_error, serialize, validation_error};
use crate::api::types::{EventResult, GridSnapshot};
use crate::config::GridConfig;
use crate::editor::{Direction, GridEvent, KeyInput};
use crate::models::{CellRange, CellRef, Column, CustomRule, Grid, Row, RowRecord, ValidationError};
use crate::session::{GridListener, GridSession};
use crate::{wasm_error, wasm_info, wasm_log};

/// Forwards grid notifications to JS callback functions.
///
/// Callbacks run while the owning `BulkGrid` is still borrowed, so they must
/// not call back into it; everything they need is passed as arguments.
#[derive(Default)]
struct JsListener {
    on_change: Option<Function>,
    on_cell_change: Option<Function>,
    on_row_add: Option<Function>,
    on_row_delete: Option<Function>,
    on_validation_error: Option<Function>,
}

impl JsListener {
    fn from_object(callbacks: &JsValue) -> Self {
        let get = |name: &str| {
            Reflect::get(callbacks, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.dyn_into::<Function>().ok())
        };
        Self {
            on_change: get("onChange"),
            on_cell_change: get("onCellChange"),
            on_row_add: get("onRowAdd"),
            on_row_delete: get("onRowDelete"),
            on_validation_error: get("onValidationError"),
        }
    }

    fn report(name: &str, result: Result<JsValue, JsValue>) {
        if let Err(e) = result {
            wasm_error!("{} callback threw: {:?}", name, e);
        }
    }

    fn registered(&self) -> usize {
        [
            &self.on_change,
            &self.on_cell_change,
            &self.on_row_add,
            &self.on_row_delete,
            &self.on_validation_error,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }
}

impl GridListener for JsListener {
    fn on_change(&mut self, grid: &Grid) {
        if let Some(f) = &self.on_change {
            if let Ok(rows) = serialize(grid, "onChange rows") {
                Self::report("onChange", f.call1(&JsValue::NULL, &rows));
            }
        }
    }

    fn on_cell_change(&mut self, row: usize, col: usize, new_value: &str, old_value: &str) {
        if let Some(f) = &self.on_cell_change {
            let args = js_sys::Array::of4(
                &JsValue::from_f64(row as f64),
                &JsValue::from_f64(col as f64),
                &JsValue::from_str(new_value),
                &JsValue::from_str(old_value),
            );
            Self::report("onCellChange", f.apply(&JsValue::NULL, &args));
        }
    }

    fn on_row_add(&mut self, index: usize, row: &[String]) {
        if let Some(f) = &self.on_row_add {
            if let Ok(data) = serialize(row, "onRowAdd row") {
                Self::report("onRowAdd", f.call2(&JsValue::NULL, &JsValue::from_f64(index as f64), &data));
            }
        }
    }

    fn on_row_delete(&mut self, index: usize, row: &[String]) {
        if let Some(f) = &self.on_row_delete {
            if let Ok(data) = serialize(row, "onRowDelete row") {
                Self::report("onRowDelete", f.call2(&JsValue::NULL, &JsValue::from_f64(index as f64), &data));
            }
        }
    }

    fn on_validation_error(&mut self, errors: &[ValidationError]) {
        if let Some(f) = &self.on_validation_error {
            if let Ok(list) = serialize(errors, "onValidationError errors") {
                Self::report("onValidationError", f.call1(&JsValue::NULL, &list));
            }
        }
    }
}

#[wasm_bindgen]
pub struct BulkGrid {
    session: GridSession,
}

impl BulkGrid {
    fn handle(&mut self, event: GridEvent) -> Result<JsValue, JsValue> {
        let outcome = self.session.dispatch(event);
        serialize(&EventResult::new(outcome, self.session.state()), "Event result")
    }

    fn cell(&self, row: usize, col: usize) -> Result<CellRef, JsValue> {
        helpers::validate_cell(self.session.grid(), row, col).map_err(validation_error)
    }
}

#[wasm_bindgen]
impl BulkGrid {
    /// Create a grid from a config object and optional seed rows (string[][])
    #[wasm_bindgen(constructor)]
    pub fn new(config_js: JsValue, seed_js: JsValue) -> Result<BulkGrid, JsValue> {
        let config: GridConfig = deserialize(config_js, "Invalid grid config")?;
        let seed: Vec<Row> = if seed_js.is_undefined() || seed_js.is_null() {
            Vec::new()
        } else {
            deserialize(seed_js, "Invalid seed rows")?
        };
        let session = GridSession::new(&config, &seed).map_err(grid_error)?;
        wasm_info!(
            "BulkGrid created: {} rows x {} columns",
            session.grid().row_count(),
            session.grid().column_count()
        );
        Ok(BulkGrid { session })
    }

    /// Create a grid with the ad-slot registration columns
    #[wasm_bindgen(js_name = slotRegistration)]
    pub fn slot_registration(seed_js: JsValue) -> Result<BulkGrid, JsValue> {
        let config = serialize(&GridConfig::slot_registration(), "Slot config")?;
        Self::new(config, seed_js)
    }

    /// Create a grid seeded from records (`{[columnId]: value}[]`).
    /// Keys that are not column ids are rejected.
    #[wasm_bindgen(js_name = fromRecords)]
    pub fn from_records(config_js: JsValue, records_js: JsValue) -> Result<BulkGrid, JsValue> {
        let config: GridConfig = deserialize(config_js, "Invalid grid config")?;
        let maps: Vec<BTreeMap<String, String>> = deserialize(records_js, "Invalid records")?;
        let schema = config.schema().map_err(grid_error)?;
        let records = maps
            .into_iter()
            .enumerate()
            .map(|(row, fields)| RowRecord::from_pairs(&schema, row, fields))
            .collect::<Result<Vec<_>, _>>()
            .map_err(grid_error)?;
        let session = GridSession::from_records(&config, &records).map_err(grid_error)?;
        wasm_info!("BulkGrid created from {} records", records.len());
        Ok(BulkGrid { session })
    }

    /// Register `{onChange, onCellChange, onRowAdd, onRowDelete, onValidationError}`.
    ///
    /// Callbacks are invoked synchronously from inside grid methods. Calling
    /// back into this grid from a callback fails with wasm-bindgen's
    /// "recursive use of an object" error; use the arguments (`onChange`
    /// receives the rows, `onValidationError` the error list) or defer the
    /// call with `queueMicrotask`.
    #[wasm_bindgen(js_name = setCallbacks)]
    pub fn set_callbacks(&mut self, callbacks: JsValue) {
        let listener = JsListener::from_object(&callbacks);
        wasm_log!("setCallbacks: {} callbacks registered", listener.registered());
        self.session.set_listener(Box::new(listener));
    }

    /// Attach `(value: string) => string | null` as the custom rule of a column
    #[wasm_bindgen(js_name = setCustomValidator)]
    pub fn set_custom_validator(&mut self, column_id: &str, validator: Function) -> Result<(), JsValue> {
        let rule = CustomRule::new(move |value| {
            validator
                .call1(&JsValue::NULL, &JsValue::from_str(value))
                .ok()
                .and_then(|r| r.as_string())
        });
        self.session
            .schema_mut()
            .set_custom_rule(column_id, rule)
            .map_err(grid_error)?;
        self.session.refresh_validation();
        Ok(())
    }

    /// Handle a DOM keydown; calls `preventDefault` on the event when required
    #[wasm_bindgen(js_name = handleKeyDown)]
    pub fn handle_key_down(&mut self, event: &web_sys::KeyboardEvent) -> Result<JsValue, JsValue> {
        let outcome = self.session.dispatch(GridEvent::Key(KeyInput::from(event)));
        if outcome.prevent_default {
            event.prevent_default();
        }
        serialize(&EventResult::new(outcome, self.session.state()), "Event result")
    }

    /// Handle a plain `{key, shiftKey, ctrlKey, altKey, metaKey, isComposing}` object
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key_js: JsValue) -> Result<JsValue, JsValue> {
        let key: KeyInput = deserialize(key_js, "Invalid key input")?;
        self.handle(GridEvent::Key(key))
    }

    /// Move the selection (0=up, 1=down, 2=left, 3=right)
    #[wasm_bindgen(js_name = moveSelection)]
    pub fn move_selection(&mut self, direction: u8) -> Result<JsValue, JsValue> {
        let dir = Direction::from_u8(direction)
            .ok_or_else(|| validation_error(format!("Invalid direction: {} (must be 0-3)", direction)))?;
        self.handle(GridEvent::Move(dir))
    }

    pub fn click(&mut self, row: usize, col: usize) -> Result<JsValue, JsValue> {
        self.handle(GridEvent::Click(CellRef::new(row, col)))
    }

    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, row: usize, col: usize) -> Result<JsValue, JsValue> {
        self.handle(GridEvent::DoubleClick(CellRef::new(row, col)))
    }

    /// The editor's text changed
    pub fn input(&mut self, text: &str) -> Result<JsValue, JsValue> {
        self.handle(GridEvent::Input(text.to_string()))
    }

    #[wasm_bindgen(js_name = compositionStart)]
    pub fn composition_start(&mut self) -> Result<JsValue, JsValue> {
        self.handle(GridEvent::CompositionStart)
    }

    #[wasm_bindgen(js_name = compositionEnd)]
    pub fn composition_end(&mut self, text: &str) -> Result<JsValue, JsValue> {
        self.handle(GridEvent::CompositionEnd(text.to_string()))
    }

    pub fn blur(&mut self) -> Result<JsValue, JsValue> {
        self.handle(GridEvent::Blur)
    }

    #[wasm_bindgen(js_name = selectOption)]
    pub fn select_option(&mut self, value: &str) -> Result<JsValue, JsValue> {
        self.handle(GridEvent::SelectOption(value.to_string()))
    }

    /// Paste clipboard text at the selected cell
    pub fn paste(&mut self, text: &str) -> bool {
        self.session.paste(text)
    }

    #[wasm_bindgen(js_name = pasteAt)]
    pub fn paste_at(&mut self, row: usize, col: usize, text: &str) -> Result<bool, JsValue> {
        let anchor = self.cell(row, col)?;
        Ok(self.session.paste_at(anchor, text))
    }

    /// TSV of the selected cell, if any
    #[wasm_bindgen(js_name = copySelection)]
    pub fn copy_selection(&self) -> Option<String> {
        self.session.copy_selection()
    }

    /// TSV of a range; corners may be given in any order
    #[wasm_bindgen(js_name = copyRange)]
    pub fn copy_range(&self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> String {
        self.session.copy(CellRange::new(
            CellRef::new(start_row, start_col),
            CellRef::new(end_row, end_col),
        ))
    }

    #[wasm_bindgen(js_name = updateCell)]
    pub fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<bool, JsValue> {
        let cell = self.cell(row, col)?;
        Ok(self.session.update_cell(cell.row, cell.col, value))
    }

    #[wasm_bindgen(js_name = addRow)]
    pub fn add_row(&mut self) -> usize {
        self.session.add_row()
    }

    /// Returns false when the row floor was reached
    #[wasm_bindgen(js_name = deleteRow)]
    pub fn delete_row(&mut self, row: usize) -> bool {
        self.session.delete_row(row)
    }

    /// Replace the column set at runtime
    #[wasm_bindgen(js_name = setColumns)]
    pub fn set_columns(&mut self, columns_js: JsValue) -> Result<(), JsValue> {
        let columns: Vec<Column> = deserialize(columns_js, "Invalid columns")?;
        wasm_info!("setColumns: {} columns", columns.len());
        self.session.set_columns(columns).map_err(grid_error)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serialize(&GridSnapshot::of(&self.session), "Grid snapshot")
    }

    #[wasm_bindgen(js_name = getRows)]
    pub fn get_rows(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.grid(), "Grid rows")
    }

    #[wasm_bindgen(js_name = getErrors)]
    pub fn get_errors(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.errors(), "Validation errors")
    }

    /// Non-blank rows keyed by column id
    #[wasm_bindgen(js_name = getRecords)]
    pub fn get_records(&self) -> Result<JsValue, JsValue> {
        let records: Vec<RowRecord> = self.session.records();
        serialize(&records, "Row records")
    }

    #[wasm_bindgen(js_name = isValid)]
    pub fn is_valid(&self) -> bool {
        self.session.is_valid()
    }
}
