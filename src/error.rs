//! Error types.
//!
//! Two layers:
//!
//! - [`StabilityError`] is what the engine returns. It is small on purpose:
//!   an estimator call either gets a valid series/configuration or it fails
//!   before computing anything.
//! - [`AppError`] is what the `stab` binary reports. It carries the process
//!   exit code alongside the message.

/// Engine-level failures.
///
/// Too-few-samples at a given tau and empty tau requests are not errors; they
/// produce shorter (or empty) results instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StabilityError {
    /// The input series is too short or contains non-finite values.
    #[error("invalid series: {0}")]
    InvalidSeries(String),
    /// A `data_type` tag other than `phase` / `frequency`.
    #[error("unsupported data type '{0}' (expected 'phase' or 'frequency')")]
    UnsupportedDataType(String),
    /// Engine configuration outside its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<StabilityError> for AppError {
    fn from(err: StabilityError) -> Self {
        let exit_code = match err {
            StabilityError::InvalidSeries(_) | StabilityError::UnsupportedDataType(_) => 3,
            StabilityError::InvalidConfig(_) => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stability_errors_map_to_exit_codes() {
        let data: AppError = StabilityError::InvalidSeries("too short".into()).into();
        assert_eq!(data.exit_code(), 3);
        assert!(data.to_string().contains("too short"));

        let config: AppError = StabilityError::InvalidConfig("fraction".into()).into();
        assert_eq!(config.exit_code(), 2);
    }
}
