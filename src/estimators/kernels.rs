//! Difference kernels over the raw phase series.
//!
//! Each function returns the deviation (not the variance) at averaging
//! factor `m`. Callers must have checked validity with
//! [`crate::policy::sample_count`]; the kernels index without further checks.

/// Overlapping Allan deviation.
///
/// ```text
/// σ² = Σ_{i<N-2m} (x[i+2m] - 2x[i+m] + x[i])² / (2 m² τ0² (N-2m))
/// ```
pub fn overlapping_2nd(x: &[f64], tau0: f64, m: usize) -> f64 {
    let n = x.len() - 2 * m;
    let mut sum = 0.0;
    for i in 0..n {
        let d = x[i + 2 * m] - 2.0 * x[i + m] + x[i];
        sum += d * d;
    }
    (sum / (2.0 * n as f64)).sqrt() / (m as f64 * tau0)
}

/// Modified Allan deviation.
///
/// The inner sum of `m` second differences is carried from one start
/// position to the next with the third-difference recurrence
///
/// ```text
/// v[j+1] = v[j] + x[j+3m] - 3x[j+2m] + 3x[j+m] - x[j]
/// ```
///
/// so each tau costs O(N) instead of O(N·m).
pub fn phase_averaged_2nd(x: &[f64], tau0: f64, m: usize) -> f64 {
    let n = x.len();
    let terms = n + 1 - 3 * m;

    let mut v = 0.0;
    for i in 0..m {
        v += x[i + 2 * m] - 2.0 * x[i + m] + x[i];
    }
    let mut sum = v * v;
    for j in 0..terms - 1 {
        v += x[j + 3 * m] - 3.0 * x[j + 2 * m] + 3.0 * x[j + m] - x[j];
        sum += v * v;
    }

    let m = m as f64;
    (sum / (2.0 * terms as f64)).sqrt() / (m * m * tau0)
}

/// Overlapping Hadamard deviation.
///
/// ```text
/// σ² = Σ_{i<N-3m} (x[i+3m] - 3x[i+2m] + 3x[i+m] - x[i])² / (6 m² τ0² (N-3m))
/// ```
pub fn overlapping_3rd(x: &[f64], tau0: f64, m: usize) -> f64 {
    let n = x.len() - 3 * m;
    let mut sum = 0.0;
    for i in 0..n {
        let d = x[i + 3 * m] - 3.0 * x[i + 2 * m] + 3.0 * x[i + m] - x[i];
        sum += d * d;
    }
    (sum / (6.0 * n as f64)).sqrt() / (m as f64 * tau0)
}

/// Parabolic deviation.
///
/// For `m = 1` the parabolic weighting vanishes and PDEV equals ADEV.
/// Otherwise, with `y[j] = x[j] - x[j+m]` and `M = N - 2m`:
///
/// ```text
/// S[i] = Σ_{k<m} ((m-1)/2 - k) · y[i+k]
/// σ²   = 72 Σ_{i<M} S[i]² / (M m⁴ τ²)
/// ```
///
/// `S[i]` is the least-squares phase-slope difference of two adjacent
/// `m`-sample windows. It is kept as `(m-1)/2 · A - B` with
/// `A = Σ y[i+k]` and `B = Σ k·y[i+k]`, both slid in O(1).
pub fn parabolic(x: &[f64], tau0: f64, m: usize) -> f64 {
    if m == 1 {
        return overlapping_2nd(x, tau0, 1);
    }

    let n = x.len();
    let windows = n - 2 * m;
    let y = |j: usize| x[j] - x[j + m];
    let half = (m as f64 - 1.0) / 2.0;

    let mut a = 0.0;
    let mut b = 0.0;
    let mut sum = 0.0;
    for i in 0..windows {
        // Resync every m steps to keep the sliding sums from drifting; this
        // adds O(N) work per tau in total.
        if i % m == 0 {
            a = 0.0;
            b = 0.0;
            for k in 0..m {
                let yk = y(i + k);
                a += yk;
                b += k as f64 * yk;
            }
        }

        let s = half * a - b;
        sum += s * s;

        if i + 1 < windows {
            let leaving = y(i);
            let entering = y(i + m);
            b = b - a + leaving + (m as f64 - 1.0) * entering;
            a = a - leaving + entering;
        }
    }

    let mf = m as f64;
    let tau = mf * tau0;
    (72.0 * sum / (windows as f64 * mf.powi(4) * tau * tau)).sqrt()
}
