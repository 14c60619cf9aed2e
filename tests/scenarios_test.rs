// End-to-end grid session scenarios: Tab growth, paste overflow,
// required-field validation, number typing guard and the row floor.

use std::cell::RefCell;
use std::rc::Rc;

use slot_grid_wasm::{
    CellRef, Column, ColumnType, EditState, Grid, GridConfig, GridEvent, GridListener, GridSession,
    KeyInput, ValidationError,
};

#[derive(Default)]
struct Log {
    changes: usize,
    cell_changes: Vec<(usize, usize, String, String)>,
    rows_added: Vec<usize>,
    rows_deleted: Vec<(usize, Vec<String>)>,
    validations: Vec<Vec<ValidationError>>,
}

struct Recorder(Rc<RefCell<Log>>);

impl GridListener for Recorder {
    fn on_change(&mut self, _grid: &Grid) {
        self.0.borrow_mut().changes += 1;
    }

    fn on_cell_change(&mut self, row: usize, col: usize, new_value: &str, old_value: &str) {
        self.0
            .borrow_mut()
            .cell_changes
            .push((row, col, new_value.to_string(), old_value.to_string()));
    }

    fn on_row_add(&mut self, index: usize, _row: &[String]) {
        self.0.borrow_mut().rows_added.push(index);
    }

    fn on_row_delete(&mut self, index: usize, row: &[String]) {
        self.0.borrow_mut().rows_deleted.push((index, row.to_vec()));
    }

    fn on_validation_error(&mut self, errors: &[ValidationError]) {
        self.0.borrow_mut().validations.push(errors.to_vec());
    }
}

fn two_columns() -> Vec<Column> {
    vec![
        Column::new("keyword", "Keyword", ColumnType::Text).required(),
        Column::new("url", "URL", ColumnType::Url),
    ]
}

fn session_with_log(config: GridConfig, seed: &[Vec<String>]) -> (GridSession, Rc<RefCell<Log>>) {
    let log = Rc::new(RefCell::new(Log::default()));
    let session = GridSession::new(&config, seed)
        .unwrap()
        .with_listener(Box::new(Recorder(log.clone())));
    (session, log)
}

fn key(k: &str) -> GridEvent {
    GridEvent::Key(KeyInput::new(k))
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_tab_while_editing_last_cell_grows_grid() {
    let config = GridConfig::new(two_columns()).with_min_rows(1);
    let (mut session, log) = session_with_log(config, &[row(&["shoes", ""])]);
    assert_eq!(session.grid().row_count(), 1);

    session.dispatch(GridEvent::Click(CellRef::new(0, 1)));
    session.dispatch(key("h"));
    session.dispatch(GridEvent::Input("https://shoes.example".into()));
    assert!(session.state().is_editing());

    let outcome = session.dispatch(key("Tab"));
    assert_eq!(session.grid().row_count(), 2);
    assert_eq!(session.state(), &EditState::Selected { cell: CellRef::new(1, 0) });
    assert_eq!(outcome.focus, Some(CellRef::new(1, 0)));
    assert!(outcome.prevent_default);
    assert_eq!(session.grid().cell(0, 1), Some("https://shoes.example"));

    // Commit is reported before the row append
    let log_ref = log.borrow();
    assert_eq!(log_ref.cell_changes, vec![(0, 1, "https://shoes.example".to_string(), String::new())]);
    assert_eq!(log_ref.rows_added, vec![1]);
    drop(log_ref);

    session.dispatch(key("Tab"));
    assert_eq!(session.state(), &EditState::Selected { cell: CellRef::new(1, 1) });
    assert_eq!(session.grid().row_count(), 2);
}

#[test]
fn test_paste_past_last_row_appends_rows() {
    let config = GridConfig::new(two_columns()).with_min_rows(1);
    let seed = vec![row(&["a", "b"]), row(&["c", "d"]), row(&["e", "f"])];
    let (mut session, log) = session_with_log(config, &seed);

    let text = "k1\thttp://1\nk2\thttp://2\nk3\thttp://3\nk4\thttp://4\nk5\thttp://5";
    assert!(session.paste_at(CellRef::new(1, 0), text));

    let grid = session.grid();
    assert_eq!(grid.row_count(), 6);
    assert_eq!(grid.row(0).unwrap(), ["a", "b"]);
    for i in 1..=5 {
        assert_eq!(grid.cell(i, 0), Some(format!("k{}", i).as_str()));
        assert_eq!(grid.cell(i, 1), Some(format!("http://{}", i).as_str()));
    }
    assert_eq!(log.borrow().rows_added, vec![3, 4, 5]);
    assert_eq!(log.borrow().changes, 1);
}

#[test]
fn test_required_validation_skips_blank_rows() {
    let config = GridConfig::new(two_columns()).with_min_rows(1);
    let blank = GridSession::new(&config, &[row(&["", ""])]).unwrap();
    assert!(blank.errors().is_empty());

    let missing = GridSession::new(&config, &[row(&["", "http://x.com"])]).unwrap();
    assert_eq!(missing.errors().len(), 1);
    assert_eq!((missing.errors()[0].row, missing.errors()[0].col), (0, 0));
    assert_eq!(missing.errors()[0].column_id, "keyword");
}

#[test]
fn test_number_column_typing_guard() {
    let config = GridConfig::new(vec![Column::new("budget", "Budget", ColumnType::Number)]);
    let mut session = GridSession::new(&config, &[]).unwrap();
    session.dispatch(GridEvent::Click(CellRef::new(0, 0)));

    session.dispatch(key("a"));
    assert_eq!(session.state(), &EditState::Selected { cell: CellRef::new(0, 0) });

    let outcome = session.dispatch(key("5"));
    assert_eq!(session.state().draft(), Some("5"));
    assert!(outcome.prevent_default);
}

#[test]
fn test_delete_at_floor_is_noop() {
    let config = GridConfig::new(two_columns()).with_min_rows(2);
    let seed = vec![row(&["a", "http://a"]), row(&["b", "http://b"])];
    let (mut session, log) = session_with_log(config, &seed);
    let before = session.grid().clone();

    assert!(!session.delete_row(0));
    assert_eq!(session.grid().row_count(), 2);
    assert_eq!(session.grid(), &before);
    assert_eq!(log.borrow().changes, 0);
    assert!(log.borrow().rows_deleted.is_empty());
}

#[test]
fn test_delete_reports_removed_row() {
    let config = GridConfig::new(two_columns()).with_min_rows(1);
    let seed = vec![row(&["a", "http://a"]), row(&["b", "http://b"])];
    let (mut session, log) = session_with_log(config, &seed);

    assert!(session.delete_row(0));
    assert_eq!(log.borrow().rows_deleted, vec![(0, row(&["a", "http://a"]))]);
    assert_eq!(session.grid().cell(0, 0), Some("b"));
}

#[test]
fn test_commit_of_unchanged_value_fires_nothing() {
    let config = GridConfig::new(two_columns());
    let (mut session, log) = session_with_log(config, &[row(&["shoes", ""])]);

    assert!(session.update_cell(0, 0, "boots"));
    let first = session.grid().clone();
    assert!(!session.update_cell(0, 0, "boots"));
    assert!(session.grid().shares_row(&first, 0));

    // Same through the state machine: open and close an edit without typing
    session.dispatch(GridEvent::Click(CellRef::new(0, 0)));
    session.dispatch(key("Enter"));
    session.dispatch(key("Enter"));

    let log = log.borrow();
    assert_eq!(log.changes, 1);
    assert_eq!(log.cell_changes.len(), 1);
    assert_eq!(log.validations.len(), 1);
}

#[test]
fn test_validation_follows_every_change() {
    let config = GridConfig::new(two_columns());
    let (mut session, log) = session_with_log(config, &[]);

    session.update_cell(2, 1, "not a url");
    session.update_cell(2, 0, "shoes");

    let log = log.borrow();
    assert_eq!(log.changes, 2);
    assert_eq!(log.validations.len(), 2);
    // keyword missing, url malformed
    assert_eq!(log.validations[0].len(), 2);
    // keyword filled, url still malformed
    assert_eq!(log.validations[1].len(), 1);
    assert_eq!(log.validations[1][0].col, 1);
}

#[test]
fn test_escape_discards_typed_draft() {
    let config = GridConfig::new(two_columns());
    let (mut session, log) = session_with_log(config, &[row(&["shoes", ""])]);

    session.dispatch(GridEvent::Click(CellRef::new(0, 0)));
    session.dispatch(key("b"));
    session.dispatch(GridEvent::Input("boots".into()));
    session.dispatch(key("Escape"));

    assert_eq!(session.grid().cell(0, 0), Some("shoes"));
    assert_eq!(session.state(), &EditState::Selected { cell: CellRef::new(0, 0) });
    assert_eq!(log.borrow().changes, 0);
}

#[test]
fn test_ime_composition_commits_final_text() {
    let config = GridConfig::new(two_columns());
    let mut session = GridSession::new(&config, &[]).unwrap();

    session.dispatch(GridEvent::Click(CellRef::new(0, 0)));
    let outcome = session.dispatch(GridEvent::Key(KeyInput::new("Process").composing()));
    assert!(!outcome.prevent_default);
    assert_eq!(session.state().draft(), Some(""));

    session.dispatch(GridEvent::Input("신".into()));
    // Enter confirms the composition, not the edit
    session.dispatch(GridEvent::Key(KeyInput::new("Enter").composing()));
    assert!(session.state().is_editing());

    session.dispatch(GridEvent::CompositionEnd("신발".into()));
    session.dispatch(key("Enter"));
    assert_eq!(session.grid().cell(0, 0), Some("신발"));
    assert_eq!(session.state(), &EditState::Selected { cell: CellRef::new(1, 0) });
}

#[test]
fn test_click_elsewhere_commits_open_edit() {
    let config = GridConfig::new(two_columns());
    let mut session = GridSession::new(&config, &[]).unwrap();

    session.dispatch(GridEvent::Click(CellRef::new(0, 0)));
    session.dispatch(key("s"));
    session.dispatch(GridEvent::Click(CellRef::new(3, 1)));

    assert_eq!(session.grid().cell(0, 0), Some("s"));
    assert_eq!(session.state(), &EditState::Selected { cell: CellRef::new(3, 1) });
}

#[test]
fn test_ctrl_c_copies_selected_cell() {
    let config = GridConfig::new(two_columns());
    let mut session = GridSession::new(&config, &[row(&["shoes", "http://s"])]).unwrap();

    session.dispatch(GridEvent::Click(CellRef::new(0, 1)));
    let outcome = session.dispatch(GridEvent::Key(KeyInput::new("c").ctrl()));
    assert_eq!(outcome.clipboard.as_deref(), Some("http://s"));
    assert_eq!(session.copy_selection().as_deref(), Some("http://s"));
}

#[test]
fn test_read_only_column_refuses_edits() {
    let config = GridConfig::new(vec![
        Column::new("id", "Slot ID", ColumnType::Text).read_only(),
        Column::new("keyword", "Keyword", ColumnType::Text),
    ]);
    let mut session = GridSession::new(&config, &[row(&["S-1", "shoes"])]).unwrap();

    session.dispatch(GridEvent::Click(CellRef::new(0, 0)));
    session.dispatch(key("Delete"));
    session.dispatch(key("x"));
    session.dispatch(key("Enter"));

    assert_eq!(session.grid().cell(0, 0), Some("S-1"));
    assert!(!session.state().is_editing());
}

#[test]
fn test_dropdown_select_commits() {
    let config = GridConfig::new(vec![
        Column::new("placement", "Placement", ColumnType::Dropdown).with_options(["search", "display"]),
    ]);
    let mut session = GridSession::new(&config, &[]).unwrap();

    session.dispatch(GridEvent::Click(CellRef::new(0, 0)));
    session.dispatch(key("Enter"));
    assert!(session.state().is_editing());

    session.dispatch(GridEvent::SelectOption("display".into()));
    assert_eq!(session.grid().cell(0, 0), Some("display"));
    assert_eq!(session.state(), &EditState::Selected { cell: CellRef::new(0, 0) });
}

#[test]
fn test_records_and_unknown_keys() {
    let config = GridConfig::slot_registration();
    let seed = vec![row(&["shoes", "https://shoes.example", "100", "", "search", ""])];
    let session = GridSession::new(&config, &seed).unwrap();

    assert!(session.is_valid(), "{:?}", session.errors());
    let records = session.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("dailyBudget"), Some("100"));

    let err = slot_grid_wasm::RowRecord::from_pairs(session.schema(), 0, [("price", "1")]);
    assert!(matches!(err, Err(slot_grid_wasm::GridError::UnknownField(_))));
}
