//! Deviation estimators.
//!
//! All nine estimators go through [`compute`]:
//!
//! - drop averaging factors the estimator cannot support (see [`crate::policy`])
//! - evaluate the kind's [`Kernel`] at every remaining `m` (in parallel)
//! - attach an error bar from the configured [`crate::domain::ErrorModel`]
//!
//! Responsibilities are split by kernel family:
//!
//! - [`kernels`]: ADEV, MDEV, HDEV, PDEV on the raw series
//! - [`total`]: TOTDEV, MTOTDEV on reflected extensions
//! - [`interval`]: TIE, MTIE

pub mod interval;
pub mod kernels;
pub mod total;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{DataType, DeviationPoint, DeviationResult, EngineConfig, EstimatorKind, Kernel};
use crate::edf::error_bar;
use crate::error::StabilityError;
use crate::policy::{self, MIN_ANALYSIS_LEN};
use crate::series::{PhaseSeries, input_to_phase};
use crate::tau::{self, TauSet, TauSpec};

/// Below this many samples per-tau work is too small to be worth the pool.
pub const PARALLEL_MIN_LEN: usize = 256;

/// Whether [`compute`] fans taus out over the rayon pool.
pub fn runs_in_parallel(config: &EngineConfig, n: usize, taus: &TauSet) -> bool {
    config.parallel && n >= PARALLEL_MIN_LEN && taus.len() > 1
}

/// Run one estimator over a tau set.
///
/// Invalid averaging factors are omitted, so the result may be shorter than
/// `taus`. Series shorter than [`MIN_ANALYSIS_LEN`] give an empty result.
pub fn compute(
    kind: EstimatorKind,
    phase: &PhaseSeries,
    taus: &TauSet,
    config: &EngineConfig,
) -> DeviationResult {
    let n = phase.len();
    let tau0 = phase.tau0();
    if n < MIN_ANALYSIS_LEN || taus.is_empty() {
        debug!(estimator = kind.name(), n, taus = taus.len(), "nothing to evaluate");
        return DeviationResult::empty(kind, tau0);
    }

    let x = phase.values();
    let evaluate = |&m: &usize| -> Option<DeviationPoint> {
        let windows = policy::sample_count(kind, n, m)?;
        let tau = m as f64 * tau0;
        let mut deviation = kernel_deviation(kind.kernel(), x, tau0, m);
        if kind == EstimatorKind::Tdev {
            deviation *= tau / 3f64.sqrt();
        }
        if !deviation.is_finite() {
            return None;
        }
        let error = error_bar(kind, &config.error_model, n, m, windows, deviation);
        Some(DeviationPoint {
            m,
            tau,
            deviation,
            error,
            n: windows,
        })
    };

    // Taus are independent; rayon's ordered collect keeps increasing tau order.
    let points: Vec<DeviationPoint> = if runs_in_parallel(config, n, taus) {
        taus.ms().par_iter().filter_map(evaluate).collect()
    } else {
        taus.ms().iter().filter_map(evaluate).collect()
    };

    debug!(
        estimator = kind.name(),
        n,
        requested = taus.len(),
        emitted = points.len(),
        "estimator evaluated"
    );

    DeviationResult { kind, tau0, points }
}

/// Boundary entry point: raw data in, one estimator's result out.
///
/// The minimum-length rule applies to the input as given: three frequency
/// samples give an empty result even though they integrate to four phase
/// samples.
pub fn analyze(
    data: &[f64],
    data_type: DataType,
    rate: f64,
    tau_spec: &TauSpec,
    kind: EstimatorKind,
    config: &EngineConfig,
) -> Result<DeviationResult, StabilityError> {
    config.validate()?;
    let phase = input_to_phase(data, data_type, rate)?;
    if data.len() < MIN_ANALYSIS_LEN {
        return Ok(DeviationResult::empty(kind, phase.tau0()));
    }
    let taus = tau::generate(phase.len(), phase.tau0(), tau_spec, config.tau_fraction)?;
    Ok(compute(kind, &phase, &taus, config))
}

/// The deviation produced by a kernel at one valid averaging factor.
pub fn kernel_deviation(kernel: Kernel, x: &[f64], tau0: f64, m: usize) -> f64 {
    match kernel {
        Kernel::Overlapping2nd => kernels::overlapping_2nd(x, tau0, m),
        Kernel::PhaseAveraged2nd => kernels::phase_averaged_2nd(x, tau0, m),
        Kernel::Overlapping3rd => kernels::overlapping_3rd(x, tau0, m),
        Kernel::Reflected2nd => total::reflected_2nd(x, tau0, m),
        Kernel::ReflectedPhaseAveraged => total::reflected_phase_averaged(x, tau0, m),
        Kernel::Parabolic => kernels::parabolic(x, tau0, m),
        Kernel::TimeInterval => interval::tie_rms(x, m),
        Kernel::TimeIntervalMax => interval::mtie(x, m),
    }
}

/// The full per-window TIE sequence at `m`, or `None` if `m` is not valid
/// for this series.
pub fn tie_sequence(phase: &PhaseSeries, m: usize) -> Option<Vec<f64>> {
    policy::sample_count(EstimatorKind::Tie, phase.len(), m)?;
    Some(interval::tie_values(phase.values(), m))
}

/// Overlapping Allan deviation with the default configuration.
pub fn adev(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Adev, phase, taus, &EngineConfig::default())
}

pub fn mdev(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Mdev, phase, taus, &EngineConfig::default())
}

pub fn tdev(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Tdev, phase, taus, &EngineConfig::default())
}

/// Overlapping Hadamard deviation with the default configuration.
pub fn hdev(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Hdev, phase, taus, &EngineConfig::default())
}

pub fn totdev(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Totdev, phase, taus, &EngineConfig::default())
}

pub fn mtotdev(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Mtotdev, phase, taus, &EngineConfig::default())
}

pub fn pdev(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Pdev, phase, taus, &EngineConfig::default())
}

pub fn tie(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Tie, phase, taus, &EngineConfig::default())
}

pub fn mtie(phase: &PhaseSeries, taus: &TauSet) -> DeviationResult {
    compute(EstimatorKind::Mtie, phase, taus, &EngineConfig::default())
}
