//! Phase <-> frequency conversion.
//!
//! ```text
//! y[i]   = (x[i+1] - x[i]) / tau0        (differentiate)
//! x[i+1] = x[i] + y[i] * tau0, x[0] = 0  (integrate)
//! ```
//!
//! Integration cannot recover the initial absolute phase; a round trip
//! reproduces the input up to an additive constant.

use crate::domain::DataType;
use crate::error::StabilityError;
use crate::series::{FrequencySeries, MIN_SERIES_LEN, PhaseSeries, tau0_from_rate};

/// First-difference a phase series into fractional frequency.
pub fn to_frequency(phase: &PhaseSeries) -> FrequencySeries {
    let tau0 = phase.tau0();
    let values = phase
        .values()
        .windows(2)
        .map(|w| (w[1] - w[0]) / tau0)
        .collect();
    FrequencySeries { values, tau0 }
}

/// Integrate fractional frequency into phase, starting at zero.
pub fn to_phase(frequency: &[f64], tau0: f64) -> Result<PhaseSeries, StabilityError> {
    if frequency.len() < MIN_SERIES_LEN {
        return Err(StabilityError::InvalidSeries(format!(
            "frequency series needs at least {MIN_SERIES_LEN} samples, got {}",
            frequency.len()
        )));
    }
    if let Some(idx) = frequency.iter().position(|v| !v.is_finite()) {
        return Err(StabilityError::InvalidSeries(format!(
            "frequency series has a non-finite value at index {idx}"
        )));
    }

    let mut values = Vec::with_capacity(frequency.len() + 1);
    let mut acc = 0.0;
    values.push(acc);
    for &y in frequency {
        acc += y * tau0;
        values.push(acc);
    }
    PhaseSeries::new(values, tau0)
}

/// Boundary entry point: tagged raw data plus a sampling rate.
pub fn input_to_phase(data: &[f64], data_type: DataType, rate: f64) -> Result<PhaseSeries, StabilityError> {
    let tau0 = tau0_from_rate(rate)?;
    match data_type {
        DataType::Phase => PhaseSeries::new(data.to_vec(), tau0),
        DataType::Frequency => to_phase(data, tau0),
    }
}

/// Like [`input_to_phase`], but with the `data_type` tag as a string.
pub fn tagged_input_to_phase(data: &[f64], data_type: &str, rate: f64) -> Result<PhaseSeries, StabilityError> {
    let data_type: DataType = data_type.parse()?;
    input_to_phase(data, data_type, rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_recovers_phase_up_to_constant() {
        let x: Vec<f64> = (0..200)
            .map(|i| {
                let t = i as f64;
                7.5 + 1e-9 * (0.3 * t).sin() + 2e-11 * t * t
            })
            .collect();
        let phase = PhaseSeries::new(x.clone(), 0.5).unwrap();

        let freq = to_frequency(&phase);
        assert_eq!(freq.len(), x.len() - 1);

        let back = to_phase(freq.values(), 0.5).unwrap();
        assert_eq!(back.len(), x.len());
        let offset = x[0] - back.values()[0];
        for (a, b) in x.iter().zip(back.values()) {
            assert!((a - (b + offset)).abs() < 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn frequency_of_linear_phase_is_constant() {
        let phase = PhaseSeries::new(vec![0.0, 2.0, 4.0, 6.0], 2.0).unwrap();
        let freq = to_frequency(&phase);
        assert_eq!(freq.values(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn to_phase_rejects_short_or_non_finite_input() {
        assert!(matches!(to_phase(&[1.0], 1.0), Err(StabilityError::InvalidSeries(_))));
        assert!(matches!(
            to_phase(&[1.0, f64::INFINITY], 1.0),
            Err(StabilityError::InvalidSeries(_))
        ));
    }

    #[test]
    fn tagged_input_dispatches_on_data_type() {
        let phase = tagged_input_to_phase(&[1.0, 2.0, 3.0], "phase", 1.0).unwrap();
        assert_eq!(phase.values(), &[1.0, 2.0, 3.0]);

        let integrated = tagged_input_to_phase(&[1.0, 1.0], "frequency", 2.0).unwrap();
        assert_eq!(integrated.values(), &[0.0, 0.5, 1.0]);

        assert!(matches!(
            tagged_input_to_phase(&[1.0, 2.0], "counts", 1.0),
            Err(StabilityError::UnsupportedDataType(_))
        ));
    }
}
