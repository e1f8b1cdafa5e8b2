//! Averaging-factor (tau) selection.

pub mod grid;

pub use grid::*;
