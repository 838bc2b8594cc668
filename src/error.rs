//! Error types.
//!
//! - `ModelError` is the taxonomy of the regression core. Fold-level numeric
//!   failures (`SingularFit`, `NoValidMetrics`) are recovered by the callers;
//!   the structural ones travel up to the binary.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Failures raised by the fitting, selection and forecasting code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// No training rows are available for the requested cutoff or fold.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A required target or predictor column is absent from the dataset.
    #[error("Required column '{0}' not found in the dataset.")]
    MissingColumn(String),

    /// The design matrix for this feature set is rank deficient.
    #[error("Singular design matrix for features [{}]", features.join(", "))]
    SingularFit { features: Vec<String> },

    /// No fold produced a comparable actual/predicted pair.
    #[error("No valid actual/predicted pairs to score.")]
    NoValidMetrics,

    /// Caller-supplied parameter is not usable (e.g. unknown month label).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ModelError {
    pub fn singular(features: &[String]) -> Self {
        ModelError::SingularFit {
            features: features.to_vec(),
        }
    }

    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ModelError::MissingColumn(_) | ModelError::InvalidInput(_) => 2,
            ModelError::InsufficientData(_) => 3,
            ModelError::SingularFit { .. } | ModelError::NoValidMetrics => 4,
        }
    }
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

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
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
