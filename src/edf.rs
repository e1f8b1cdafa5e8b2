//! Error bars from equivalent degrees of freedom.
//!
//! Overlapping windows are correlated, so the number of windows `n` overstates
//! how much independent information a point carries. With
//! [`ErrorModel::Edf`] the error bar is `deviation / sqrt(edf)` where `edf`
//! depends on the estimator family and on the assumed noise type:
//!
//! - ADEV and PDEV use the closed-form overlapping-ADEV approximations
//!   (Howe, Allan & Barnes), with `N` the number of phase samples:
//!
//!   ```text
//!   WPM : (N+1)(N-2m) / (2(N-m))
//!   FPM : exp( sqrt( ln((N-1)/2m) * ln((2m+1)(N-1)/4) ) )
//!   WFM : (3(N-1)/2m - 2(N-2)/N) * 4m^2 / (4m^2 + 5)
//!   FFM : 2(N-2) / (2.3N - 4.9)          m = 1
//!         5N^2 / (4m(N + 3m))            m >= 2
//!   RWFM: (N-2)/m * ((N-1)^2 - 3m(N-1) + 4m^2) / (N-3)^2
//!   ```
//!
//! - MDEV and TDEV evaluate the same forms at `N' = N - m + 1` (the inner
//!   phase average consumes `m - 1` samples).
//! - HDEV evaluates them at `N' = N - m` (one extra difference).
//! - TOTDEV and MTOTDEV use `edf = b * (T/tau) - c` with `T = (N-1) tau0`.
//! - TIE and MTIE are not noise-power estimates; they always use
//!   `deviation / sqrt(n)`.
//!
//! Whenever a closed form degenerates (non-finite or below one) the model
//! falls back to the window count, so a point never gets an infinite or NaN
//! error bar.

use crate::domain::{ErrorModel, EstimatorKind, NoiseType};

/// Equivalent degrees of freedom, or `None` if the estimator has no edf model
/// or the formula degenerates.
pub fn edf(kind: EstimatorKind, noise: NoiseType, n_samples: usize, m: usize) -> Option<f64> {
    if m == 0 || n_samples < 4 {
        return None;
    }
    let value = match kind {
        EstimatorKind::Adev | EstimatorKind::Pdev => adev_edf(noise, n_samples as f64, m as f64),
        EstimatorKind::Mdev | EstimatorKind::Tdev => {
            adev_edf(noise, (n_samples + 1).checked_sub(m)? as f64, m as f64)
        }
        EstimatorKind::Hdev => adev_edf(noise, n_samples.checked_sub(m)? as f64, m as f64),
        EstimatorKind::Totdev => {
            let (b, c) = totdev_coefficients(noise);
            b * (n_samples as f64 - 1.0) / m as f64 - c
        }
        EstimatorKind::Mtotdev => {
            let (b, c) = mtotdev_coefficients(noise);
            b * (n_samples as f64 - 1.0) / m as f64 - c
        }
        EstimatorKind::Tie | EstimatorKind::Mtie => return None,
    };

    (value.is_finite() && value >= 1.0).then_some(value)
}

/// Error bar for one point.
///
/// `n_used` is the number of windows behind the point (always >= 1 for an
/// emitted point).
pub fn error_bar(
    kind: EstimatorKind,
    model: &ErrorModel,
    n_samples: usize,
    m: usize,
    n_used: usize,
    deviation: f64,
) -> f64 {
    let naive = deviation / (n_used.max(1) as f64).sqrt();
    match model {
        ErrorModel::Naive => naive,
        ErrorModel::Edf(noise) => match edf(kind, *noise, n_samples, m) {
            Some(dof) => deviation / dof.sqrt(),
            None => naive,
        },
    }
}

fn adev_edf(noise: NoiseType, n: f64, m: f64) -> f64 {
    match noise {
        NoiseType::Wpm => (n + 1.0) * (n - 2.0 * m) / (2.0 * (n - m)),
        NoiseType::Fpm => {
            let a = ((n - 1.0) / (2.0 * m)).ln();
            let b = ((2.0 * m + 1.0) * (n - 1.0) / 4.0).ln();
            if a <= 0.0 || b <= 0.0 {
                return f64::NAN;
            }
            (a * b).sqrt().exp()
        }
        NoiseType::Wfm => {
            (3.0 * (n - 1.0) / (2.0 * m) - 2.0 * (n - 2.0) / n) * 4.0 * m * m / (4.0 * m * m + 5.0)
        }
        NoiseType::Ffm => {
            if m <= 1.0 {
                2.0 * (n - 2.0) / (2.3 * n - 4.9)
            } else {
                5.0 * n * n / (4.0 * m * (n + 3.0 * m))
            }
        }
        NoiseType::Rwfm => {
            let d = n - 3.0;
            (n - 2.0) / m * ((n - 1.0).powi(2) - 3.0 * m * (n - 1.0) + 4.0 * m * m) / (d * d)
        }
    }
}

/// TOTDEV `(b, c)`; phase noises use the white-FM row.
fn totdev_coefficients(noise: NoiseType) -> (f64, f64) {
    match noise {
        NoiseType::Wpm | NoiseType::Fpm | NoiseType::Wfm => (1.50, 0.0),
        NoiseType::Ffm => (1.17, 0.22),
        NoiseType::Rwfm => (0.93, 0.36),
    }
}

fn mtotdev_coefficients(noise: NoiseType) -> (f64, f64) {
    match noise {
        NoiseType::Wpm => (1.90, 2.1),
        NoiseType::Fpm => (1.20, 1.40),
        NoiseType::Wfm => (1.10, 1.2),
        NoiseType::Ffm => (0.85, 0.50),
        NoiseType::Rwfm => (0.75, 0.31),
    }
}
