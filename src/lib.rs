//! Bulk Slot-Entry Grid WASM Module
//!
//! Core of the spreadsheet-style grid used to register and edit ad slots in
//! bulk: an editable string matrix, per-column validation, TSV clipboard
//! support and a keyboard-driven navigation/edit state machine.

pub mod api;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use config::GridConfig;
pub use editor::{EditState, Effect, GridEvent, KeyInput};
pub use error::GridError;
pub use models::*;
pub use session::{DispatchOutcome, GridListener, GridSession};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if console_log::init_with_level(log::Level::Debug).is_err() {
            wasm_warn!("logger already initialized");
        }
    }

    log::info!("Bulk grid WASM module initialized");
}
