//! Input/output helpers.
//!
//! - text/gzip series ingest (`ingest`)
//! - result document JSON read/write (`results`)
//! - flat CSV export (`export`)

pub mod export;
pub mod ingest;
pub mod results;

pub use export::*;
pub use ingest::*;
pub use results::*;
