//! Least squares solver and power-law fits.
//!
//! Stability curves are straight lines in log-log space: `σ(τ) ≈ h · τ^μ`.
//! Fitting `ln σ = ln h + μ ln τ` is a tiny linear regression:
//!
//! ```text
//! minimize Σ (ln σ_i - [1, ln τ_i] · β)^2
//! ```
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when
//!   the design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Points with a non-positive or non-finite tau/deviation are skipped; a
//!   zero deviation has no logarithm.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// `σ ≈ exp(intercept) · τ^slope`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawFit {
    pub slope: f64,
    pub intercept: f64,
    /// Number of points that entered the fit.
    pub points: usize,
}

impl PowerLawFit {
    pub fn predict(&self, tau: f64) -> f64 {
        (self.intercept + self.slope * tau.ln()).exp()
    }
}

/// Fit a power law through `(tau, deviation)` pairs.
///
/// Needs at least two usable points with distinct taus.
pub fn fit_power_law(taus: &[f64], deviations: &[f64]) -> Option<PowerLawFit> {
    let pairs: Vec<(f64, f64)> = taus
        .iter()
        .zip(deviations)
        .filter(|(t, d)| t.is_finite() && d.is_finite() && **t > 0.0 && **d > 0.0)
        .map(|(t, d)| (t.ln(), d.ln()))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    // Repeated taus leave the slope column rank-deficient.
    let first = pairs[0].0;
    if !pairs.iter().any(|p| (p.0 - first).abs() > 1e-12) {
        return None;
    }

    let n = pairs.len();
    let mut x = DMatrix::<f64>::zeros(n, 2);
    let mut y = DVector::<f64>::zeros(n);
    for (i, (lt, ld)) in pairs.iter().enumerate() {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = *lt;
        y[i] = *ld;
    }

    let beta = solve_least_squares(&x, &y)?;
    Some(PowerLawFit {
        intercept: beta[0],
        slope: beta[1],
        points: n,
    })
}
