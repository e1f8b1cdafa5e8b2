//! `stab-curves` library crate.
//!
//! Frequency-stability statistics (Allan-family deviations, TIE/MTIE) for
//! clock phase and frequency data. The binary (`stab`) is a thin wrapper
//! around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimators are reusable from other tools

pub mod app;
pub mod batch;
pub mod cli;
pub mod domain;
pub mod edf;
pub mod error;
pub mod estimators;
pub mod io;
pub mod logging;
pub mod math;
pub mod noise;
pub mod policy;
pub mod report;
pub mod series;
pub mod tau;
