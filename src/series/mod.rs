//! Validated input series and phase/frequency conversion.
//!
//! Every estimator works on a [`PhaseSeries`]. Frequency data is integrated
//! into phase first (see [`convert`]).

pub mod convert;

pub use convert::*;

use crate::error::StabilityError;

/// Minimum length of any series accepted by the engine.
pub const MIN_SERIES_LEN: usize = 2;

/// Phase residuals (seconds) sampled every `tau0` seconds.
///
/// Invariants: `len >= 2`, `tau0 > 0`, every value finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSeries {
    values: Vec<f64>,
    tau0: f64,
}

impl PhaseSeries {
    pub fn new(values: Vec<f64>, tau0: f64) -> Result<Self, StabilityError> {
        validate_tau0(tau0)?;
        validate_values(&values, "phase")?;
        Ok(Self { values, tau0 })
    }

    /// Build from a sampling rate in Hz (`tau0 = 1 / rate`).
    pub fn from_rate(values: Vec<f64>, rate: f64) -> Result<Self, StabilityError> {
        Self::new(values, tau0_from_rate(rate)?)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn tau0(&self) -> f64 {
        self.tau0
    }

    pub fn rate(&self) -> f64 {
        1.0 / self.tau0
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed series; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `[min, max]` of the phase values.
    pub fn range(&self) -> [f64; 2] {
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        [min, max]
    }
}

/// Fractional frequency derived from a phase series; `len = phase.len() - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySeries {
    values: Vec<f64>,
    tau0: f64,
}

impl FrequencySeries {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn tau0(&self) -> f64 {
        self.tau0
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

pub(crate) fn tau0_from_rate(rate: f64) -> Result<f64, StabilityError> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(StabilityError::InvalidSeries(format!(
            "sampling rate must be finite and > 0, got {rate}"
        )));
    }
    Ok(1.0 / rate)
}

fn validate_tau0(tau0: f64) -> Result<(), StabilityError> {
    if !(tau0.is_finite() && tau0 > 0.0) {
        return Err(StabilityError::InvalidSeries(format!(
            "sampling interval must be finite and > 0, got {tau0}"
        )));
    }
    Ok(())
}

fn validate_values(values: &[f64], what: &str) -> Result<(), StabilityError> {
    if values.len() < MIN_SERIES_LEN {
        return Err(StabilityError::InvalidSeries(format!(
            "{what} series needs at least {MIN_SERIES_LEN} samples, got {}",
            values.len()
        )));
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(StabilityError::InvalidSeries(format!(
            "{what} series has a non-finite value at index {idx}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_series_rejects_bad_input() {
        assert!(PhaseSeries::new(vec![1.0], 1.0).is_err());
        assert!(PhaseSeries::new(vec![1.0, f64::NAN, 2.0], 1.0).is_err());
        assert!(PhaseSeries::new(vec![1.0, 2.0], 0.0).is_err());
        assert!(PhaseSeries::from_rate(vec![1.0, 2.0], -1.0).is_err());

        let ok = PhaseSeries::from_rate(vec![0.0, 3.0, -1.0], 4.0).unwrap();
        assert_eq!(ok.len(), 3);
        assert!((ok.tau0() - 0.25).abs() < 1e-15);
        assert_eq!(ok.range(), [-1.0, 3.0]);
    }
}
