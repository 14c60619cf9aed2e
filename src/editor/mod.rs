//! Keyboard/pointer handling for the grid
//!
//! - `keys`: keyboard input as seen by the grid
//! - `machine`: the pure navigation/edit state machine

pub mod keys;
pub mod machine;

pub use keys::{Direction, Key, KeyInput};
pub use machine::{transition, EditState, Effect, GridContext, GridEvent, Transition};
