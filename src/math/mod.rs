//! Mathematical utilities: least squares and log-log power-law fits.

pub mod ols;

pub use ols::*;
