//! Tau grid generation.
//!
//! Estimators are evaluated on a set of integer averaging factors `m`
//! (`tau = m * tau0`). The ladders here decide which `m` to visit:
//!
//! - `all`: every `m` up to `N/2` (exhaustive, expensive)
//! - `octave`: powers of two
//! - `decade`: `(1, 2, 5) * 10^k`
//! - `log`: a fixed number of log-spaced points
//! - explicit `m` or `tau` lists
//!
//! The ladders are capped at `floor(N * fraction)`. The fraction is always
//! supplied by the caller; different workflows want different caps.

use crate::error::StabilityError;
use crate::policy::MIN_ANALYSIS_LEN;

/// Ordered, distinct averaging factors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TauSet {
    ms: Vec<usize>,
}

impl TauSet {
    /// Sort, deduplicate and drop `m = 0`. Magnitude is not checked here;
    /// each estimator applies its own validity predicate.
    pub fn from_ms(ms: impl IntoIterator<Item = usize>) -> Self {
        let mut ms: Vec<usize> = ms.into_iter().filter(|&m| m >= 1).collect();
        ms.sort_unstable();
        ms.dedup();
        Self { ms }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ms(&self) -> &[usize] {
        &self.ms
    }

    pub fn len(&self) -> usize {
        self.ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ms.is_empty()
    }

    /// Averaging times `m * tau0`.
    pub fn taus(&self, tau0: f64) -> Vec<f64> {
        self.ms.iter().map(|&m| m as f64 * tau0).collect()
    }
}

/// How to choose the averaging factors.
#[derive(Debug, Clone, PartialEq)]
pub enum TauSpec {
    All,
    Octave,
    Decade,
    Log { points: usize },
    /// Explicit averaging factors.
    Ms(Vec<usize>),
    /// Explicit averaging times in seconds, rounded to the nearest `m`.
    Taus(Vec<f64>),
}

/// Produce the tau set for a series of `n` samples.
///
/// Returns an empty set (not an error) when `n` is too small for any
/// statistic.
pub fn generate(n: usize, tau0: f64, spec: &TauSpec, fraction: f64) -> Result<TauSet, StabilityError> {
    if n < MIN_ANALYSIS_LEN {
        return Ok(TauSet::empty());
    }

    let set = match spec {
        TauSpec::All => TauSet::from_ms(1..=n / 2),
        TauSpec::Octave => TauSet::from_ms(ladder(n, fraction, |k| 1usize.checked_shl(k as u32))?),
        TauSpec::Decade => TauSet::from_ms(ladder(n, fraction, decade_rung)?),
        TauSpec::Log { points } => log_ladder(n, fraction, *points)?,
        TauSpec::Ms(ms) => TauSet::from_ms(ms.iter().copied()),
        TauSpec::Taus(taus) => TauSet::from_ms(taus.iter().filter_map(|&t| m_from_tau(t, tau0))),
    };
    Ok(set)
}

/// Cap for the ladder strategies: `floor(n * fraction)`, at least 1.
pub fn ladder_cap(n: usize, fraction: f64) -> Result<usize, StabilityError> {
    if !(fraction.is_finite() && fraction > 0.0 && fraction <= 0.5) {
        return Err(StabilityError::InvalidConfig(format!(
            "tau fraction must be in (0, 0.5], got {fraction}"
        )));
    }
    Ok(((n as f64 * fraction).floor() as usize).max(1))
}

/// Walk rungs `rung(0), rung(1), ...` up to and including the first rung
/// that reaches the cap, never past `n / 2`.
fn ladder(
    n: usize,
    fraction: f64,
    rung: impl Fn(usize) -> Option<usize>,
) -> Result<Vec<usize>, StabilityError> {
    let cap = ladder_cap(n, fraction)?;
    let bound = n / 2;

    let mut out = Vec::new();
    for k in 0.. {
        let Some(m) = rung(k) else { break };
        if m > bound {
            break;
        }
        out.push(m);
        if m >= cap {
            break;
        }
    }
    Ok(out)
}

fn decade_rung(k: usize) -> Option<usize> {
    const MULTIPLIERS: [usize; 3] = [1, 2, 5];
    let exp = u32::try_from(k / 3).ok()?;
    10usize.checked_pow(exp)?.checked_mul(MULTIPLIERS[k % 3])
}

fn log_ladder(n: usize, fraction: f64, points: usize) -> Result<TauSet, StabilityError> {
    if points < 2 {
        return Err(StabilityError::InvalidConfig("log tau spacing needs at least 2 points".into()));
    }
    let cap = ladder_cap(n, fraction)?;
    if cap == 1 {
        return Ok(TauSet::from_ms([1]));
    }
    let values = log_space(1.0, cap as f64, points)?;
    // Truncate like an integer cast of a float log grid; the small bias keeps
    // exact endpoints such as 250.0 from landing on 249.
    Ok(TauSet::from_ms(values.into_iter().map(|v| (v + 1e-9).floor() as usize)))
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, StabilityError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(StabilityError::InvalidConfig(format!(
            "invalid log range: min={min}, max={max} (must be finite, >0, and max>min)"
        )));
    }
    if steps < 2 {
        return Err(StabilityError::InvalidConfig("log steps must be >= 2".into()));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

fn m_from_tau(tau: f64, tau0: f64) -> Option<usize> {
    if !(tau.is_finite() && tau > 0.0 && tau0.is_finite() && tau0 > 0.0) {
        return None;
    }
    let m = (tau / tau0).round();
    if m >= 1.0 && m < usize::MAX as f64 { Some(m as usize) } else { None }
}
