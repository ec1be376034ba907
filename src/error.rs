//! Error types.
//!
//! - `FitError`: the two failure kinds of the fitting core. Every fit path ends
//!   in either a parameter set or one of these.
//! - `AppError`: binary-level error carrying a process exit code.

/// Message reported when too few valid points remain after filtering.
pub const INSUFFICIENT_DATA_MESSAGE: &str = "At least 4 data points are required for a 4PL fit.";

/// Failure of a single fit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitError {
    /// Fewer than four positive-concentration pairs remained after filtering.
    InsufficientData,
    /// The solver did not converge, or the input could not be used at all.
    FitFailure(String),
}

impl FitError {
    pub fn failure(message: impl Into<String>) -> Self {
        FitError::FitFailure(message.into())
    }
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::InsufficientData => write!(f, "{INSUFFICIENT_DATA_MESSAGE}"),
            FitError::FitFailure(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FitError {}

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

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::InsufficientData => AppError::new(3, INSUFFICIENT_DATA_MESSAGE),
            FitError::FitFailure(message) => AppError::new(4, message),
        }
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
