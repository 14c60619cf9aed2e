//! Navigation / edit state machine
//!
//! `transition` is a pure function from (state, event, grid context) to the
//! next state plus a list of effects. It never touches the grid: mutations are
//! requested through `Effect::Commit` and `Effect::AppendRow` and applied by
//! the session in order. A `Focus` effect, when present, is always last so the
//! host moves focus only after the grid reflects the transition.
//!
//! ## States
//! - Idle: nothing selected
//! - Selected: one cell has keyboard focus
//! - Editing: the selected cell has an open draft

use serde::{Deserialize, Serialize};

use super::keys::{Direction, Key, KeyInput};
use crate::models::{CellRange, CellRef, Column, ColumnSchema, ColumnType, Grid};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum EditState {
    #[default]
    Idle,
    Selected {
        cell: CellRef,
    },
    Editing {
        cell: CellRef,
        draft: String,
        /// Cell value when the edit opened
        original: String,
        /// An IME composition is in progress
        composing: bool,
    },
}

impl EditState {
    pub fn selected(&self) -> Option<CellRef> {
        match self {
            EditState::Idle => None,
            EditState::Selected { cell } | EditState::Editing { cell, .. } => Some(*cell),
        }
    }

    pub fn editing(&self) -> Option<CellRef> {
        match self {
            EditState::Editing { cell, .. } => Some(*cell),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            EditState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing { .. })
    }
}

/// Input the state machine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    Key(KeyInput),
    /// Arrow-style move requested by the host without a key event
    Move(Direction),
    Click(CellRef),
    DoubleClick(CellRef),
    /// The editor's text changed
    Input(String),
    CompositionStart,
    CompositionEnd(String),
    Blur,
    /// A dropdown option was picked
    SelectOption(String),
}

/// Side effect requested by a transition
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Effect {
    /// Write `value` into `cell`
    Commit { cell: CellRef, value: String },
    /// Append one empty row at the bottom
    AppendRow,
    /// Put the range on the clipboard
    Copy { range: CellRange },
    /// Move host focus to `cell` (after all mutations)
    Focus { cell: CellRef },
    /// Host should cancel the native handling of the event
    PreventDefault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: EditState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &EditState) -> Self {
        Self { state: state.clone(), effects: Vec::new() }
    }

    fn to(state: EditState) -> Self {
        Self { state, effects: Vec::new() }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Read-only view of the grid the state machine needs
#[derive(Clone, Copy)]
pub struct GridContext<'a> {
    pub grid: &'a Grid,
    pub schema: &'a ColumnSchema,
}

impl<'a> GridContext<'a> {
    pub fn new(grid: &'a Grid, schema: &'a ColumnSchema) -> Self {
        Self { grid, schema }
    }

    fn rows(&self) -> usize {
        self.grid.row_count()
    }

    fn cols(&self) -> usize {
        self.grid.column_count().min(self.schema.len())
    }

    fn in_bounds(&self, cell: CellRef) -> bool {
        cell.row < self.rows() && cell.col < self.cols()
    }

    fn value(&self, cell: CellRef) -> String {
        self.grid.cell(cell.row, cell.col).unwrap_or("").to_string()
    }

    /// Column for `cell` if the cell can be written
    fn writable(&self, cell: CellRef) -> Option<&'a Column> {
        self.schema.get(cell.col).filter(|c| !c.read_only)
    }

    /// One step in `dir`, wrapping horizontally between rows
    fn step(&self, cell: CellRef, dir: Direction) -> Option<CellRef> {
        let last_col = self.cols().checked_sub(1)?;
        match dir {
            Direction::Up => (cell.row > 0).then(|| CellRef::new(cell.row - 1, cell.col)),
            Direction::Down => {
                (cell.row + 1 < self.rows()).then(|| CellRef::new(cell.row + 1, cell.col))
            }
            Direction::Left if cell.col > 0 => Some(CellRef::new(cell.row, cell.col - 1)),
            Direction::Left => (cell.row > 0).then(|| CellRef::new(cell.row - 1, last_col)),
            Direction::Right if cell.col < last_col => Some(CellRef::new(cell.row, cell.col + 1)),
            Direction::Right => {
                (cell.row + 1 < self.rows()).then(|| CellRef::new(cell.row + 1, 0))
            }
        }
    }

    /// Tab target; the flag is set when a row must be appended first.
    /// Only forward Tab off the last cell grows the grid.
    fn tab_target(&self, cell: CellRef, backwards: bool) -> Option<(CellRef, bool)> {
        if backwards {
            return self.step(cell, Direction::Left).map(|c| (c, false));
        }
        match self.step(cell, Direction::Right) {
            Some(next) => Some((next, false)),
            None if self.cols() > 0 => Some((CellRef::new(cell.row + 1, 0), true)),
            None => None,
        }
    }

    /// Enter moves down when there is a row below, otherwise stays put
    fn enter_target(&self, cell: CellRef) -> CellRef {
        self.step(cell, Direction::Down).unwrap_or(cell)
    }
}

/// Compute the next state and effects for `event`
pub fn transition(state: &EditState, event: &GridEvent, ctx: &GridContext<'_>) -> Transition {
    let next = match (state, event) {
        (_, GridEvent::Click(target)) => on_click(state, *target, ctx),
        (_, GridEvent::DoubleClick(target)) => on_double_click(state, *target, ctx),
        (EditState::Idle, _) => Transition::unchanged(state),
        (EditState::Selected { cell }, GridEvent::Key(key)) => selected_key(*cell, key, ctx),
        (EditState::Selected { cell }, GridEvent::Move(dir)) => match ctx.step(*cell, *dir) {
            Some(dest) => Transition::to(EditState::Selected { cell: dest }),
            None => Transition::unchanged(state),
        },
        (EditState::Selected { cell }, GridEvent::CompositionStart) => {
            match ctx.writable(*cell) {
                Some(col) if accepts_composition(col) => Transition::to(open_edit(*cell, String::new(), true, ctx)),
                _ => Transition::unchanged(state),
            }
        }
        (EditState::Selected { cell }, GridEvent::SelectOption(value)) => {
            select_option(state, *cell, value, ctx)
        }
        (EditState::Selected { .. }, _) => Transition::unchanged(state),
        (EditState::Editing { .. }, _) => editing(state, event, ctx),
    };
    finish(state, event, next)
}

/// Append the trailing focus effect when the selection moved or an edit closed.
/// Blur never pulls focus back.
fn finish(prev: &EditState, event: &GridEvent, mut next: Transition) -> Transition {
    if matches!(event, GridEvent::Blur) {
        return next;
    }
    if let EditState::Selected { cell } = next.state {
        let moved = prev.selected() != Some(cell);
        if moved || prev.is_editing() {
            next.effects.push(Effect::Focus { cell });
        }
    }
    next
}

fn open_edit(cell: CellRef, draft: String, composing: bool, ctx: &GridContext<'_>) -> EditState {
    EditState::Editing {
        cell,
        draft,
        original: ctx.value(cell),
        composing,
    }
}

fn accepts_composition(col: &Column) -> bool {
    col.column_type.accepts_typed_entry() && col.column_type != ColumnType::Number
}

/// Commit effect for a draft, or nothing when the value is unchanged or the
/// cell is read-only
fn commit(cell: CellRef, draft: &str, ctx: &GridContext<'_>) -> Option<Effect> {
    let writable = ctx.in_bounds(cell) && ctx.writable(cell).is_some();
    (writable && ctx.value(cell) != draft).then(|| Effect::Commit {
        cell,
        value: draft.to_string(),
    })
}

fn selected_key(cell: CellRef, key: &KeyInput, ctx: &GridContext<'_>) -> Transition {
    let current = EditState::Selected { cell };
    let parsed = key.parsed();

    if let Some(dir) = parsed.direction() {
        return match ctx.step(cell, dir) {
            Some(dest) => Transition::to(EditState::Selected { cell: dest }).with(Effect::PreventDefault),
            None => Transition::unchanged(&current),
        };
    }

    match parsed {
        Key::Tab => tab_move(cell, key.shift_key, None, ctx).unwrap_or_else(|| Transition::unchanged(&current)),
        Key::Enter | Key::F2 => match ctx.writable(cell) {
            Some(_) => Transition::to(open_edit(cell, ctx.value(cell), false, ctx)).with(Effect::PreventDefault),
            None => Transition::unchanged(&current),
        },
        Key::Delete | Key::Backspace => match ctx.writable(cell) {
            Some(_) => {
                let mut t = Transition::to(current);
                t.effects.extend(commit(cell, "", ctx));
                t.with(Effect::PreventDefault)
            }
            None => Transition::unchanged(&current),
        },
        Key::Escape => Transition::to(EditState::Idle),
        Key::Char(c) if (key.ctrl_key || key.meta_key) && c.eq_ignore_ascii_case(&'c') => {
            Transition::to(current)
                .with(Effect::Copy { range: CellRange::single(cell) })
                .with(Effect::PreventDefault)
        }
        _ => type_to_edit(cell, key, ctx).unwrap_or_else(|| Transition::unchanged(&current)),
    }
}

/// A printable keystroke on a selected cell opens an edit
fn type_to_edit(cell: CellRef, key: &KeyInput, ctx: &GridContext<'_>) -> Option<Transition> {
    let column = ctx.writable(cell)?;
    if !column.column_type.accepts_typed_entry() || key.has_command_modifier() {
        return None;
    }

    if key.starts_composition() {
        // Let the composition reach the native input untouched
        return accepts_composition(column).then(|| Transition::to(open_edit(cell, String::new(), true, ctx)));
    }

    let ch = key.printable()?;
    if !column.column_type.accepts_char(ch) {
        return None;
    }
    Some(Transition::to(open_edit(cell, ch.to_string(), false, ctx)).with(Effect::PreventDefault))
}

/// Tab / Shift+Tab move, optionally committing a draft first
fn tab_move(cell: CellRef, backwards: bool, committed: Option<Effect>, ctx: &GridContext<'_>) -> Option<Transition> {
    let (dest, append) = ctx.tab_target(cell, backwards)?;
    let mut t = Transition::to(EditState::Selected { cell: dest });
    t.effects.extend(committed);
    if append {
        t.effects.push(Effect::AppendRow);
    }
    Some(t.with(Effect::PreventDefault))
}

fn select_option(state: &EditState, cell: CellRef, value: &str, ctx: &GridContext<'_>) -> Transition {
    match ctx.writable(cell) {
        Some(col) if col.column_type == ColumnType::Dropdown && col.options.iter().any(|o| o == value) => {
            let mut t = Transition::to(EditState::Selected { cell });
            t.effects.extend(commit(cell, value, ctx));
            t
        }
        _ => Transition::unchanged(state),
    }
}

fn editing(state: &EditState, event: &GridEvent, ctx: &GridContext<'_>) -> Transition {
    let EditState::Editing { cell, draft, original, composing } = state else {
        return Transition::unchanged(state);
    };
    let cell = *cell;
    let column_type = ctx.schema.get(cell.col).map(|c| c.column_type).unwrap_or_default();

    match event {
        GridEvent::Key(key) => {
            if *composing || key.is_composing {
                return Transition::unchanged(state);
            }
            match key.parsed() {
                Key::Enter if key.shift_key && column_type == ColumnType::Textarea => {
                    Transition::unchanged(state)
                }
                Key::Enter => {
                    let dest = ctx.enter_target(cell);
                    let mut t = Transition::to(EditState::Selected { cell: dest });
                    t.effects.extend(commit(cell, draft, ctx));
                    t.with(Effect::PreventDefault)
                }
                Key::Tab => {
                    let committed = commit(cell, draft, ctx);
                    tab_move(cell, key.shift_key, committed.clone(), ctx).unwrap_or_else(|| {
                        // Shift+Tab on the first cell still closes the edit
                        let mut t = Transition::to(EditState::Selected { cell });
                        t.effects.extend(committed);
                        t.with(Effect::PreventDefault)
                    })
                }
                Key::Escape => Transition::to(EditState::Selected { cell }).with(Effect::PreventDefault),
                _ => Transition::unchanged(state),
            }
        }
        GridEvent::Input(text) => Transition::to(EditState::Editing {
            cell,
            draft: column_type.filter_input(text),
            original: original.clone(),
            composing: *composing,
        }),
        GridEvent::CompositionStart => Transition::to(EditState::Editing {
            cell,
            draft: draft.clone(),
            original: original.clone(),
            composing: true,
        }),
        GridEvent::CompositionEnd(text) => Transition::to(EditState::Editing {
            cell,
            draft: column_type.filter_input(text),
            original: original.clone(),
            composing: false,
        }),
        GridEvent::Blur => {
            let mut t = Transition::to(EditState::Selected { cell });
            t.effects.extend(commit(cell, draft, ctx));
            t
        }
        GridEvent::SelectOption(value) => select_option(state, cell, value, ctx),
        GridEvent::Move(_) => Transition::unchanged(state),
        GridEvent::Click(_) | GridEvent::DoubleClick(_) => Transition::unchanged(state),
    }
}

fn on_click(state: &EditState, target: CellRef, ctx: &GridContext<'_>) -> Transition {
    if !ctx.in_bounds(target) {
        return Transition::unchanged(state);
    }
    match state {
        EditState::Editing { cell, .. } if *cell == target => Transition::unchanged(state),
        EditState::Editing { cell, draft, .. } => {
            let mut t = Transition::to(EditState::Selected { cell: target });
            t.effects.extend(commit(*cell, draft, ctx));
            t
        }
        _ => Transition::to(EditState::Selected { cell: target }),
    }
}

fn on_double_click(state: &EditState, target: CellRef, ctx: &GridContext<'_>) -> Transition {
    if !ctx.in_bounds(target) {
        return Transition::unchanged(state);
    }
    let mut effects = Vec::new();
    match state {
        EditState::Editing { cell, .. } if *cell == target => return Transition::unchanged(state),
        EditState::Editing { cell, draft, .. } => effects.extend(commit(*cell, draft, ctx)),
        _ => {}
    }
    let state = match ctx.writable(target) {
        Some(_) => open_edit(target, ctx.value(target), false, ctx),
        None => EditState::Selected { cell: target },
    };
    Transition { state, effects }
}
