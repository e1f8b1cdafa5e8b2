//! Dominant power-law noise identification from the slope of a stability
//! curve.
//!
//! In the power-law model `σ(τ) ∝ τ^μ`, and `μ` depends on both the noise type
//! and the estimator:
//!
//! | noise | ADEV / HDEV / TOTDEV | MDEV / MTOTDEV |
//! | - | - | - |
//! | WPM  | -1   | -3/2 |
//! | FPM  | -1   | -1   |
//! | WFM  | -1/2 | -1/2 |
//! | FFM  | 0    | 0    |
//! | RWFM | +1/2 | +1/2 |
//!
//! ADEV cannot separate white from flicker PM; a slope near -1 is reported as
//! white PM. The result is meant for picking an edf noise assumption, not as
//! a replacement for a lag-1 autocorrelation identifier.

use crate::domain::{DeviationResult, EstimatorKind, NoiseType};
use crate::math::{PowerLawFit, fit_power_law};

/// The identified noise type together with the fit it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseEstimate {
    pub noise: NoiseType,
    pub fit: PowerLawFit,
}

/// Identify the dominant noise type of a whole curve.
///
/// Returns `None` for estimators without a slope table (TDEV, PDEV, TIE,
/// MTIE) and for curves with fewer than two usable points.
pub fn identify_noise(result: &DeviationResult) -> Option<NoiseEstimate> {
    let table = slope_table(result.kind)?;
    let fit = fit_power_law(&result.taus(), &result.deviations())?;
    let noise = table
        .iter()
        .min_by(|a, b| {
            (a.0 - fit.slope)
                .abs()
                .partial_cmp(&(b.0 - fit.slope).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(_, noise)| *noise)?;
    Some(NoiseEstimate { noise, fit })
}

fn slope_table(kind: EstimatorKind) -> Option<&'static [(f64, NoiseType)]> {
    const ALLAN: &[(f64, NoiseType)] = &[
        (-1.0, NoiseType::Wpm),
        (-0.5, NoiseType::Wfm),
        (0.0, NoiseType::Ffm),
        (0.5, NoiseType::Rwfm),
    ];
    const MODIFIED: &[(f64, NoiseType)] = &[
        (-1.5, NoiseType::Wpm),
        (-1.0, NoiseType::Fpm),
        (-0.5, NoiseType::Wfm),
        (0.0, NoiseType::Ffm),
        (0.5, NoiseType::Rwfm),
    ];
    match kind {
        EstimatorKind::Adev | EstimatorKind::Hdev | EstimatorKind::Totdev => Some(ALLAN),
        EstimatorKind::Mdev | EstimatorKind::Mtotdev => Some(MODIFIED),
        EstimatorKind::Tdev | EstimatorKind::Pdev | EstimatorKind::Tie | EstimatorKind::Mtie => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviationPoint;

    fn curve(kind: EstimatorKind, slope: f64) -> DeviationResult {
        let points = (0..8)
            .map(|k| {
                let m = 1usize << k;
                let tau = m as f64;
                DeviationPoint {
                    m,
                    tau,
                    deviation: 1e-11 * tau.powf(slope),
                    error: 0.0,
                    n: 100,
                }
            })
            .collect();
        DeviationResult {
            kind,
            tau0: 1.0,
            points,
        }
    }

    #[test]
    fn allan_slopes_map_to_noise_types() {
        let cases = [(-1.0, NoiseType::Wpm), (-0.45, NoiseType::Wfm), (0.1, NoiseType::Ffm), (0.5, NoiseType::Rwfm)];
        for (slope, want) in cases {
            let got = identify_noise(&curve(EstimatorKind::Adev, slope)).unwrap();
            assert_eq!(got.noise, want, "slope {slope}");
        }
    }

    #[test]
    fn modified_slopes_separate_phase_noises() {
        assert_eq!(identify_noise(&curve(EstimatorKind::Mdev, -1.5)).unwrap().noise, NoiseType::Wpm);
        assert_eq!(identify_noise(&curve(EstimatorKind::Mdev, -1.0)).unwrap().noise, NoiseType::Fpm);
    }

    #[test]
    fn interval_errors_are_not_classified() {
        assert!(identify_noise(&curve(EstimatorKind::Mtie, 1.0)).is_none());
        assert!(identify_noise(&DeviationResult::empty(EstimatorKind::Adev, 1.0)).is_none());
    }
}
