//! Export deviation curves to CSV.
//!
//! One row per (estimator, tau), so several curves fit in one file that is
//! easy to pivot in spreadsheets or downstream scripts.

use std::path::Path;

use serde::Serialize;

use crate::domain::DeviationResult;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    estimator: &'a str,
    tau: f64,
    m: usize,
    deviation: f64,
    error: f64,
    n: usize,
}

/// Write every point of `results` to a CSV file.
pub fn write_results_csv(path: &Path, results: &[DeviationResult]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut wrote_any = false;
    for result in results {
        for p in &result.points {
            writer
                .serialize(ExportRow {
                    estimator: result.kind.name(),
                    tau: p.tau,
                    m: p.m,
                    deviation: p.deviation,
                    error: p.error,
                    n: p.n,
                })
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
            wrote_any = true;
        }
    }

    // serde-driven headers only appear with the first row.
    if !wrote_any {
        writer
            .write_record(["estimator", "tau", "m", "deviation", "error", "n"])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviationPoint, EstimatorKind};

    fn point(m: usize, deviation: f64) -> DeviationPoint {
        DeviationPoint {
            m,
            tau: m as f64 * 0.5,
            deviation,
            error: deviation / 10.0,
            n: 100 - m,
        }
    }

    #[test]
    fn writes_one_row_per_point() {
        let results = vec![
            DeviationResult {
                kind: EstimatorKind::Adev,
                tau0: 0.5,
                points: vec![point(1, 2.0), point(2, 1.0)],
            },
            DeviationResult {
                kind: EstimatorKind::Mtie,
                tau0: 0.5,
                points: vec![point(4, 3.0)],
            },
        ];
        let path = std::env::temp_dir().join(format!("stab-export-{}.csv", std::process::id()));
        write_results_csv(&path, &results).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "estimator,tau,m,deviation,error,n");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "adev,0.5,1,2.0,0.2,99");
        assert!(lines[3].starts_with("mtie,2.0,4,3.0,"));
    }

    #[test]
    fn empty_export_still_has_a_header() {
        let path = std::env::temp_dir().join(format!("stab-export-empty-{}.csv", std::process::id()));
        write_results_csv(&path, &[DeviationResult::empty(EstimatorKind::Adev, 1.0)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(text.trim_end(), "estimator,tau,m,deviation,error,n");
    }
}
