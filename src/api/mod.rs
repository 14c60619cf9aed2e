//! Bulk grid WASM API
//!
//! This module provides the JavaScript-facing API for the bulk-entry grid.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, validation, error handling, and logging
//! - `types`: Result types returned to JavaScript
//! - `grid`: The `BulkGrid` class wrapping one grid session

pub mod helpers;
pub mod types;
pub mod grid;

pub use grid::BulkGrid;
pub use types::{EventResult, GridSnapshot};
