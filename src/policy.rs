//! Validity of an `(N, m)` pair per estimator.
//!
//! Every emitted point must be backed by at least one window. When an
//! averaging factor cannot be supported it is dropped from the result; it is
//! never reported as NaN or zero, because consumers index results
//! positionally.

use crate::domain::{EstimatorKind, Kernel};

/// Below this many samples no estimator emits anything.
pub const MIN_ANALYSIS_LEN: usize = 4;

/// Closed-form number of windows contributing at averaging factor `m`, or
/// `None` when the pair is invalid for this estimator.
///
/// | kernel | windows | requires |
/// | - | - | - |
/// | ADEV | `N - 2m` | `N >= 2m + 1` |
/// | MDEV / TDEV | `N - 3m + 1` | `N >= 3m` |
/// | HDEV | `N - 3m` | `N >= 3m + 1` |
/// | TOTDEV | `N - 2` | `2m <= N - 1` |
/// | MTOTDEV | `N - 3m + 1` | `N >= 3m` |
/// | PDEV | `N - 2m` | `N >= 2m + 1` |
/// | TIE / MTIE | `N - m` | `N >= m + 1` |
pub fn sample_count(kind: EstimatorKind, n: usize, m: usize) -> Option<usize> {
    if n < MIN_ANALYSIS_LEN || m == 0 {
        return None;
    }

    let windows = match kind.kernel() {
        Kernel::Overlapping2nd | Kernel::Parabolic => n.checked_sub(m.checked_mul(2)?)?,
        Kernel::PhaseAveraged2nd | Kernel::ReflectedPhaseAveraged => {
            (n + 1).checked_sub(m.checked_mul(3)?)?
        }
        Kernel::Overlapping3rd => n.checked_sub(m.checked_mul(3)?)?,
        Kernel::Reflected2nd => {
            if m.checked_mul(2)? > n - 1 {
                return None;
            }
            n - 2
        }
        Kernel::TimeInterval | Kernel::TimeIntervalMax => n.checked_sub(m)?,
    };

    (windows >= 1).then_some(windows)
}

/// Whether averaging factor `m` yields a valid point for `kind`.
pub fn is_valid(kind: EstimatorKind, n: usize, m: usize) -> bool {
    sample_count(kind, n, m).is_some()
}

/// Largest valid averaging factor for `kind`, if any.
pub fn max_valid_m(kind: EstimatorKind, n: usize) -> Option<usize> {
    if n < MIN_ANALYSIS_LEN {
        return None;
    }
    // Every estimator's validity is monotone in m, so scan down from N.
    (1..n).rev().find(|&m| is_valid(kind, n, m))
}
