//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while estimators run
//! - exported to JSON/CSV
//! - reloaded later for inspection

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::StabilityError;

/// Domain of the raw input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Phase residuals in seconds.
    Phase,
    /// Fractional frequency offsets.
    Frequency,
}

impl DataType {
    pub fn name(self) -> &'static str {
        match self {
            DataType::Phase => "phase",
            DataType::Frequency => "frequency",
        }
    }
}

impl FromStr for DataType {
    type Err = StabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phase" => Ok(DataType::Phase),
            "frequency" | "freq" => Ok(DataType::Frequency),
            _ => Err(StabilityError::UnsupportedDataType(s.to_string())),
        }
    }
}

/// Accumulation pattern shared by a group of estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// `x[i+2m] - 2x[i+m] + x[i]` at every start position.
    Overlapping2nd,
    /// Second differences summed over `m` consecutive starts before squaring.
    PhaseAveraged2nd,
    /// `x[i+3m] - 3x[i+2m] + 3x[i+m] - x[i]` at every start position.
    Overlapping3rd,
    /// Second differences over an odd-reflected extension of the series.
    Reflected2nd,
    /// Phase-averaged second differences over detrended, mirrored subsequences.
    ReflectedPhaseAveraged,
    /// Least-squares phase-slope differences (parabolic weighting).
    Parabolic,
    /// Raw `x[i+m] - x[i]` excursions.
    TimeInterval,
    /// Sliding-window peak-to-peak phase.
    TimeIntervalMax,
}

/// Which deviation to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    #[value(alias = "oadev")]
    Adev,
    Mdev,
    Tdev,
    #[value(alias = "ohdev")]
    Hdev,
    Totdev,
    Mtotdev,
    Pdev,
    Tie,
    Mtie,
}

impl EstimatorKind {
    pub const ALL: [EstimatorKind; 9] = [
        EstimatorKind::Adev,
        EstimatorKind::Mdev,
        EstimatorKind::Tdev,
        EstimatorKind::Hdev,
        EstimatorKind::Totdev,
        EstimatorKind::Mtotdev,
        EstimatorKind::Pdev,
        EstimatorKind::Tie,
        EstimatorKind::Mtie,
    ];

    /// Stable lowercase key (JSON keys, CSV rows, CLI values).
    pub fn name(self) -> &'static str {
        match self {
            EstimatorKind::Adev => "adev",
            EstimatorKind::Mdev => "mdev",
            EstimatorKind::Tdev => "tdev",
            EstimatorKind::Hdev => "hdev",
            EstimatorKind::Totdev => "totdev",
            EstimatorKind::Mtotdev => "mtotdev",
            EstimatorKind::Pdev => "pdev",
            EstimatorKind::Tie => "tie",
            EstimatorKind::Mtie => "mtie",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            EstimatorKind::Adev => "Allan Deviation (Overlapping)",
            EstimatorKind::Mdev => "Modified Allan Deviation",
            EstimatorKind::Tdev => "Time Deviation",
            EstimatorKind::Hdev => "Hadamard Deviation (Overlapping)",
            EstimatorKind::Totdev => "Total Deviation",
            EstimatorKind::Mtotdev => "Modified Total Deviation",
            EstimatorKind::Pdev => "Parabolic Deviation",
            EstimatorKind::Tie => "Time Interval Error",
            EstimatorKind::Mtie => "Maximum Time Interval Error",
        }
    }

    /// The accumulation kernel this estimator is built on.
    ///
    /// TDEV has no kernel of its own; it is a rescaled MDEV.
    pub fn kernel(self) -> Kernel {
        match self {
            EstimatorKind::Adev => Kernel::Overlapping2nd,
            EstimatorKind::Mdev | EstimatorKind::Tdev => Kernel::PhaseAveraged2nd,
            EstimatorKind::Hdev => Kernel::Overlapping3rd,
            EstimatorKind::Totdev => Kernel::Reflected2nd,
            EstimatorKind::Mtotdev => Kernel::ReflectedPhaseAveraged,
            EstimatorKind::Pdev => Kernel::Parabolic,
            EstimatorKind::Tie => Kernel::TimeInterval,
            EstimatorKind::Mtie => Kernel::TimeIntervalMax,
        }
    }
}

impl FromStr for EstimatorKind {
    type Err = StabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        // Accept the overlapping aliases used by other tools.
        let key = match key.as_str() {
            "oadev" => "adev",
            "ohdev" => "hdev",
            other => other,
        };
        EstimatorKind::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or_else(|| StabilityError::InvalidConfig(format!("unknown estimator '{s}'")))
    }
}

/// Power-law noise type, `S_y(f) ∝ f^α`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NoiseType {
    /// White phase modulation (α = 2).
    Wpm,
    /// Flicker phase modulation (α = 1).
    Fpm,
    /// White frequency modulation (α = 0).
    Wfm,
    /// Flicker frequency modulation (α = -1).
    Ffm,
    /// Random-walk frequency modulation (α = -2).
    Rwfm,
}

impl NoiseType {
    pub const ALL: [NoiseType; 5] = [
        NoiseType::Wpm,
        NoiseType::Fpm,
        NoiseType::Wfm,
        NoiseType::Ffm,
        NoiseType::Rwfm,
    ];

    pub fn alpha(self) -> i32 {
        match self {
            NoiseType::Wpm => 2,
            NoiseType::Fpm => 1,
            NoiseType::Wfm => 0,
            NoiseType::Ffm => -1,
            NoiseType::Rwfm => -2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NoiseType::Wpm => "White PM",
            NoiseType::Fpm => "Flicker PM",
            NoiseType::Wfm => "White FM",
            NoiseType::Ffm => "Flicker FM",
            NoiseType::Rwfm => "Random Walk FM",
        }
    }
}

/// How error bars are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", content = "noise", rename_all = "lowercase")]
pub enum ErrorModel {
    /// `deviation / sqrt(n)`: treats every overlapping window as independent.
    Naive,
    /// `deviation / sqrt(edf)` with edf modeled for the given noise type.
    Edf(NoiseType),
}

impl Default for ErrorModel {
    fn default() -> Self {
        ErrorModel::Edf(NoiseType::Wfm)
    }
}

/// Selector for [`ErrorModel`] on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorModelKind {
    Naive,
    Edf,
}

/// Engine configuration shared by every estimator call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Fraction of N used to cap the octave/decade/log tau ladders.
    pub tau_fraction: f64,
    /// Error-bar model.
    pub error_model: ErrorModel,
    /// Evaluate taus on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tau_fraction: 0.25,
            error_model: ErrorModel::default(),
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), StabilityError> {
        if !(self.tau_fraction.is_finite() && self.tau_fraction > 0.0 && self.tau_fraction <= 0.5) {
            return Err(StabilityError::InvalidConfig(format!(
                "tau fraction must be in (0, 0.5], got {}",
                self.tau_fraction
            )));
        }
        Ok(())
    }
}

/// One evaluated averaging time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationPoint {
    /// Averaging factor.
    pub m: usize,
    /// Averaging time `m * tau0` (seconds).
    pub tau: f64,
    pub deviation: f64,
    pub error: f64,
    /// Number of (overlapping) windows that contributed.
    pub n: usize,
}

/// Output of a single estimator invocation, in increasing tau order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationResult {
    pub kind: EstimatorKind,
    pub tau0: f64,
    pub points: Vec<DeviationPoint>,
}

impl DeviationResult {
    pub fn empty(kind: EstimatorKind, tau0: f64) -> Self {
        Self {
            kind,
            tau0,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn taus(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.tau).collect()
    }

    pub fn deviations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.deviation).collect()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.error).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.n).collect()
    }

    /// The four parallel sequences in the boundary layout.
    pub fn to_series(&self) -> ResultSeries {
        ResultSeries {
            tau: self.taus(),
            dev: self.deviations(),
            err: self.errors(),
            n: self.counts(),
            description: Some(self.kind.display_name().to_string()),
        }
    }
}

/// A saved result document (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub metadata: ResultMetadata,
    /// Keyed by estimator name (`adev`, `mdev`, ...).
    pub results: BTreeMap<String, ResultSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub dataset: String,
    #[serde(rename = "N")]
    pub n: usize,
    pub tau0: f64,
    pub data_type: DataType,
    pub data_range: [f64; 2],
    pub engine_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_model: Option<ErrorModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// The four parallel sequences of one estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    pub tau: Vec<f64>,
    pub dev: Vec<f64>,
    pub err: Vec<f64>,
    pub n: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_rejects_unknown_tags() {
        assert_eq!("Phase".parse::<DataType>().unwrap(), DataType::Phase);
        assert_eq!("frequency".parse::<DataType>().unwrap(), DataType::Frequency);
        assert!(matches!(
            "counts".parse::<DataType>(),
            Err(StabilityError::UnsupportedDataType(tag)) if tag == "counts"
        ));
    }

    #[test]
    fn estimator_names_round_trip() {
        for kind in EstimatorKind::ALL {
            assert_eq!(kind.name().parse::<EstimatorKind>().unwrap(), kind);
        }
        assert_eq!("OADEV".parse::<EstimatorKind>().unwrap(), EstimatorKind::Adev);
        assert_eq!("ohdev".parse::<EstimatorKind>().unwrap(), EstimatorKind::Hdev);
        assert!("xdev".parse::<EstimatorKind>().is_err());
    }

    #[test]
    fn config_fraction_bounds() {
        let mut config = EngineConfig::default();
        assert!(config.validate().is_ok());
        config.tau_fraction = 0.0;
        assert!(config.validate().is_err());
        config.tau_fraction = 0.75;
        assert!(config.validate().is_err());
        config.tau_fraction = 0.5;
        assert!(config.validate().is_ok());
    }
}
