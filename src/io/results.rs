//! Read/write result documents.
//!
//! A result document is the portable form of one analysis run:
//! - metadata about the analyzed series (length, tau0, input type, range)
//! - one `{tau, dev, err, n}` block per estimator
//!
//! The schema is defined by `domain::ResultFile`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;

use crate::domain::{DataType, DeviationResult, ErrorModel, ResultFile, ResultMetadata};
use crate::error::AppError;
use crate::series::PhaseSeries;

/// Assemble a result document for `phase` and the curves computed from it.
pub fn build_result_file(
    dataset: &str,
    phase: &PhaseSeries,
    data_type: DataType,
    error_model: ErrorModel,
    results: &[DeviationResult],
) -> ResultFile {
    let metadata = ResultMetadata {
        dataset: dataset.to_string(),
        n: phase.len(),
        tau0: phase.tau0(),
        data_type,
        data_range: phase.range(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        error_model: Some(error_model),
        generated_at: Some(Utc::now()),
    };
    let results: BTreeMap<String, _> = results
        .iter()
        .map(|r| (r.kind.name().to_string(), r.to_series()))
        .collect();
    ResultFile { metadata, results }
}

/// Write a result document as pretty JSON.
pub fn write_result_json(path: &Path, doc: &ResultFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), doc)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Read a result document.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let doc: ResultFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))?;

    for (name, series) in &doc.results {
        let len = series.tau.len();
        if series.dev.len() != len || series.err.len() != len || series.n.len() != len {
            return Err(AppError::new(
                3,
                format!("Result '{name}' has sequences of different lengths."),
            ));
        }
    }
    Ok(doc)
}
