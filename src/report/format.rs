//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimator code stays clean and testable
//! - output changes are localized

use crate::batch::{BatchOutcome, BatchUnit};
use crate::domain::{DataType, DeviationResult, EngineConfig, ErrorModel, ResultFile, ResultSeries};
use crate::noise::identify_noise;
use crate::series::PhaseSeries;

/// Format the run header (dataset stats + engine settings).
pub fn format_run_summary(dataset: &str, phase: &PhaseSeries, data_type: DataType, config: &EngineConfig) -> String {
    let mut out = String::new();
    let [lo, hi] = phase.range();

    out.push_str("=== stab - frequency stability ===\n");
    out.push_str(&format!("Dataset: {dataset}\n"));
    out.push_str(&format!(
        "Input: {} | N={} (phase) | tau0={}s\n",
        data_type.name(),
        phase.len(),
        fmt_sci(phase.tau0())
    ));
    out.push_str(&format!("Phase range: [{}, {}]s\n", fmt_sci(lo), fmt_sci(hi)));
    out.push_str(&format!(
        "Errors: {} | tau fraction={}\n",
        fmt_error_model(&config.error_model),
        config.tau_fraction
    ));
    out
}

/// Format one estimator curve, followed by a noise-slope note when available.
pub fn format_result_table(result: &DeviationResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", result.kind.display_name(), result.kind.name()));

    if result.is_empty() {
        out.push_str("  (no tau had enough samples)\n");
        return out;
    }

    out.push_str(&table_header());
    for p in &result.points {
        out.push_str(&table_row(p.tau, Some(p.m), p.deviation, p.error, p.n));
    }

    if let Some(est) = identify_noise(result) {
        out.push_str(&format!(
            "  slope {:+.2} over {} points -> {}\n",
            est.fit.slope,
            est.fit.points,
            est.noise.display_name()
        ));
    }
    out
}

/// Format a saved result document.
pub fn format_result_file(doc: &ResultFile) -> String {
    let meta = &doc.metadata;
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", meta.dataset));
    out.push_str(&format!(
        "Input: {} | N={} | tau0={}s | range=[{}, {}]s\n",
        meta.data_type.name(),
        meta.n,
        fmt_sci(meta.tau0),
        fmt_sci(meta.data_range[0]),
        fmt_sci(meta.data_range[1])
    ));
    let mut provenance = format!("Engine: {}", meta.engine_version);
    if let Some(model) = &meta.error_model {
        provenance.push_str(&format!(" | errors: {}", fmt_error_model(model)));
    }
    if let Some(at) = meta.generated_at {
        provenance.push_str(&format!(" | generated {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    out.push_str(&provenance);
    out.push('\n');

    for (name, series) in &doc.results {
        out.push('\n');
        let title = series.description.as_deref().unwrap_or(name);
        out.push_str(&format!("{title} ({name})\n"));
        out.push_str(&format_series(series));
    }
    out
}

fn format_series(series: &ResultSeries) -> String {
    let mut out = table_header();
    for i in 0..series.tau.len() {
        out.push_str(&table_row(series.tau[i], None, series.dev[i], series.err[i], series.n[i]));
    }
    out
}

/// One line per batch unit.
pub fn format_batch_summary(units: &[BatchUnit]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<24} {:<8} {:<10} {:>7} {:>10}\n", "dataset", "kind", "status", "points", "ms"));
    out.push_str(&format!("{:-<24} {:-<8} {:-<10} {:->7} {:->10}\n", "", "", "", "", ""));

    for u in units {
        let line = match &u.outcome {
            BatchOutcome::Completed { result, elapsed } => format!(
                "{:<24} {:<8} {:<10} {:>7} {:>10.2}",
                truncate(&u.dataset, 24),
                u.kind.name(),
                "ok",
                result.len(),
                elapsed.as_secs_f64() * 1e3
            ),
            BatchOutcome::Cancelled => {
                format!("{:<24} {:<8} {:<10}", truncate(&u.dataset, 24), u.kind.name(), "cancelled")
            }
            BatchOutcome::Failed(message) => format!(
                "{:<24} {:<8} {:<10} {message}",
                truncate(&u.dataset, 24),
                u.kind.name(),
                "failed"
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn table_header() -> String {
    let mut out = format!(
        "{:>12} {:>8} {:>12} {:>12} {:>8}\n",
        "tau[s]", "m", "deviation", "error", "n"
    );
    out.push_str(&format!("{:->12} {:->8} {:->12} {:->12} {:->8}\n", "", "", "", "", ""));
    out
}

fn table_row(tau: f64, m: Option<usize>, deviation: f64, error: f64, n: usize) -> String {
    let m = m.map(|m| m.to_string()).unwrap_or_default();
    format!(
        "{:>12} {:>8} {:>12} {:>12} {:>8}\n",
        fmt_sci(tau),
        m,
        fmt_sci(deviation),
        fmt_sci(error),
        n
    )
}

fn fmt_error_model(model: &ErrorModel) -> String {
    match model {
        ErrorModel::Naive => "naive (dev/sqrt(n))".to_string(),
        ErrorModel::Edf(noise) => format!("edf, {}", noise.display_name()),
    }
}

fn fmt_sci(v: f64) -> String {
    format!("{v:.4e}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviationPoint, EstimatorKind, NoiseType};
    use crate::io::build_result_file;
    use std::time::Duration;

    fn adev_curve() -> DeviationResult {
        let points = (0..5)
            .map(|k| {
                let m = 1usize << k;
                DeviationPoint {
                    m,
                    tau: m as f64,
                    deviation: 1e-11 / (m as f64).sqrt(),
                    error: 1e-13,
                    n: 1000 - 2 * m,
                }
            })
            .collect();
        DeviationResult {
            kind: EstimatorKind::Adev,
            tau0: 1.0,
            points,
        }
    }

    #[test]
    fn result_table_lists_points_and_noise() {
        let text = format_result_table(&adev_curve());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Allan Deviation (Overlapping) (adev)"));
        assert!(lines[1].contains("deviation"));
        // title + header + rule + 5 rows + slope note
        assert_eq!(lines.len(), 9);
        assert!(lines[3].contains("1.0000e-11"));
        assert!(lines[8].contains("-0.50"));
        assert!(lines[8].contains(NoiseType::Wfm.display_name()));
    }

    #[test]
    fn empty_result_says_so() {
        let text = format_result_table(&DeviationResult::empty(EstimatorKind::Mtie, 1.0));
        assert!(text.contains("no tau"));
    }

    #[test]
    fn result_file_lists_every_estimator() {
        let phase = PhaseSeries::new(vec![0.0, 1e-9, 3e-9, 2e-9], 1.0).unwrap();
        let doc = build_result_file("lab-maser", &phase, DataType::Phase, ErrorModel::Naive, &[adev_curve()]);
        let text = format_result_file(&doc);
        assert!(text.starts_with("=== lab-maser ==="));
        assert!(text.contains("N=4"));
        assert!(text.contains("naive"));
        assert!(text.contains("(adev)"));
    }

    #[test]
    fn batch_summary_shows_each_status() {
        let units = vec![
            BatchUnit {
                index: 0,
                dataset: "a".into(),
                kind: EstimatorKind::Adev,
                outcome: BatchOutcome::Completed {
                    result: adev_curve(),
                    elapsed: Duration::from_millis(3),
                },
            },
            BatchUnit {
                index: 0,
                dataset: "a-very-long-dataset-name-that-overflows".into(),
                kind: EstimatorKind::Hdev,
                outcome: BatchOutcome::Cancelled,
            },
            BatchUnit {
                index: 0,
                dataset: "b".into(),
                kind: EstimatorKind::Mtie,
                outcome: BatchOutcome::Failed("bad fraction".into()),
            },
        ];
        let text = format_batch_summary(&units);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("ok"));
        assert!(lines[3].contains("cancelled"));
        assert!(lines[3].starts_with("a-very-long-dataset-nam."));
        assert!(lines[4].ends_with("bad fraction"));
    }
}
