//! Batch evaluation over many datasets and estimators.
//!
//! Every (dataset, estimator) pair is an independent unit scheduled on the
//! rayon pool. Cancellation is best-effort: the token is checked before a unit
//! starts, and a unit that has started always runs to completion. A unit whose
//! tau ladder cannot be built is reported as failed; the rest still run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{DeviationResult, EngineConfig, EstimatorKind};
use crate::estimators::compute;
use crate::series::PhaseSeries;
use crate::tau::{self, TauSet, TauSpec};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A named phase series and the taus to evaluate it at.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub phase: PhaseSeries,
    pub taus: TauSpec,
}

#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Completed { result: DeviationResult, elapsed: Duration },
    Cancelled,
    Failed(String),
}

/// Outcome of one (dataset, estimator) unit.
#[derive(Debug, Clone)]
pub struct BatchUnit {
    /// Position of the dataset in the `run_batch` input.
    pub index: usize,
    pub dataset: String,
    pub kind: EstimatorKind,
    pub outcome: BatchOutcome,
}

impl BatchUnit {
    pub fn result(&self) -> Option<&DeviationResult> {
        match &self.outcome {
            BatchOutcome::Completed { result, .. } => Some(result),
            BatchOutcome::Cancelled | BatchOutcome::Failed(_) => None,
        }
    }
}

/// Run every estimator in `kinds` over every dataset.
///
/// Output order is dataset-major, estimator-minor, matching the inputs.
pub fn run_batch(
    datasets: &[Dataset],
    kinds: &[EstimatorKind],
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Vec<BatchUnit> {
    let tau_sets: Vec<Result<TauSet, String>> = datasets
        .iter()
        .map(|d| {
            config
                .validate()
                .and_then(|_| tau::generate(d.phase.len(), d.phase.tau0(), &d.taus, config.tau_fraction))
                .map_err(|e| e.to_string())
        })
        .collect();

    let units: Vec<(usize, EstimatorKind)> = (0..datasets.len())
        .flat_map(|d| kinds.iter().map(move |&k| (d, k)))
        .collect();

    info!(datasets = datasets.len(), estimators = kinds.len(), units = units.len(), "starting batch");

    let out: Vec<BatchUnit> = units
        .par_iter()
        .map(|&(d, kind)| {
            let dataset = &datasets[d];
            let outcome = run_unit(dataset, kind, &tau_sets[d], config, cancel);
            BatchUnit {
                index: d,
                dataset: dataset.name.clone(),
                kind,
                outcome,
            }
        })
        .collect();

    let completed = out.iter().filter(|u| u.result().is_some()).count();
    let cancelled = out
        .iter()
        .filter(|u| matches!(u.outcome, BatchOutcome::Cancelled))
        .count();
    info!(completed, cancelled, failed = out.len() - completed - cancelled, "batch finished");
    out
}

fn run_unit(
    dataset: &Dataset,
    kind: EstimatorKind,
    taus: &Result<TauSet, String>,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> BatchOutcome {
    if cancel.is_cancelled() {
        debug!(dataset = %dataset.name, estimator = kind.name(), "unit cancelled");
        return BatchOutcome::Cancelled;
    }
    let taus = match taus {
        Ok(taus) => taus,
        Err(message) => {
            warn!(dataset = %dataset.name, estimator = kind.name(), error = %message, "unit failed");
            return BatchOutcome::Failed(message.clone());
        }
    };

    let started = Instant::now();
    let result = compute(kind, &dataset.phase, taus, config);
    let elapsed = started.elapsed();
    debug!(
        dataset = %dataset.name,
        estimator = kind.name(),
        points = result.len(),
        elapsed_ms = elapsed.as_secs_f64() * 1e3,
        "unit completed"
    );
    BatchOutcome::Completed { result, elapsed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(name: &str, n: usize, scale: f64, taus: TauSpec) -> Dataset {
        let values = (0..n).map(|i| scale * ((i as f64) * 0.7).sin()).collect();
        Dataset {
            name: name.to_string(),
            phase: PhaseSeries::new(values, 1.0).unwrap(),
            taus,
        }
    }

    #[test]
    fn batch_preserves_unit_order_and_matches_single_calls() {
        let datasets = vec![
            dataset("a", 400, 1.0, TauSpec::Octave),
            dataset("b", 300, 2.0, TauSpec::Octave),
        ];
        let kinds = [EstimatorKind::Adev, EstimatorKind::Mtie, EstimatorKind::Totdev];
        let config = EngineConfig::default();
        let units = run_batch(&datasets, &kinds, &config, &CancelToken::new());

        assert_eq!(units.len(), 6);
        let order: Vec<(&str, EstimatorKind)> = units.iter().map(|u| (u.dataset.as_str(), u.kind)).collect();
        assert_eq!(
            order,
            vec![
                ("a", EstimatorKind::Adev),
                ("a", EstimatorKind::Mtie),
                ("a", EstimatorKind::Totdev),
                ("b", EstimatorKind::Adev),
                ("b", EstimatorKind::Mtie),
                ("b", EstimatorKind::Totdev),
            ]
        );

        assert_eq!(units.iter().map(|u| u.index).collect::<Vec<_>>(), vec![0, 0, 0, 1, 1, 1]);

        let taus = tau::generate(300, 1.0, &TauSpec::Octave, 0.25).unwrap();
        let direct = compute(EstimatorKind::Mtie, &datasets[1].phase, &taus, &config);
        assert_eq!(units[4].result(), Some(&direct));
    }

    #[test]
    fn cancelled_token_skips_every_unit() {
        let datasets = vec![dataset("a", 200, 1.0, TauSpec::Octave)];
        let cancel = CancelToken::new();
        cancel.clone().cancel();
        let units = run_batch(&datasets, &EstimatorKind::ALL, &EngineConfig::default(), &cancel);
        assert_eq!(units.len(), EstimatorKind::ALL.len());
        assert!(units.iter().all(|u| matches!(u.outcome, BatchOutcome::Cancelled)));
    }

    #[test]
    fn bad_tau_spec_fails_only_its_dataset() {
        let datasets = vec![
            dataset("bad", 100, 1.0, TauSpec::Log { points: 0 }),
            dataset("good", 100, 1.0, TauSpec::Octave),
        ];
        let units = run_batch(&datasets, &[EstimatorKind::Adev], &EngineConfig::default(), &CancelToken::new());
        assert!(matches!(units[0].outcome, BatchOutcome::Failed(_)));
        assert!(units[1].result().is_some_and(|r| !r.is_empty()));
    }

    #[test]
    fn invalid_config_fails_every_unit() {
        let config = EngineConfig {
            tau_fraction: 2.0,
            ..EngineConfig::default()
        };
        let units = run_batch(
            &[dataset("a", 100, 1.0, TauSpec::Octave)],
            &[EstimatorKind::Adev, EstimatorKind::Hdev],
            &config,
            &CancelToken::new(),
        );
        assert!(units.iter().all(|u| matches!(&u.outcome, BatchOutcome::Failed(m) if m.contains("fraction"))));
    }
}
