//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - input configuration enums (`DataType`, `EstimatorKind`, `NoiseType`, `ErrorModel`)
//! - the engine configuration (`EngineConfig`)
//! - estimator outputs (`DeviationPoint`, `DeviationResult`) and the saved JSON schema

pub mod types;

pub use types::*;
