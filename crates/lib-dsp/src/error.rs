//! Error types for DSP operations.

use thiserror::Error;

/// Errors that can occur during DSP operations.
#[derive(Debug, Error, PartialEq)]
pub enum DspError {
    /// Input length mismatch.
    #[error("Input length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Insufficient data for operation.
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Decimation factor or target length out of range.
    #[error("Invalid resampling factor: {0}")]
    InvalidFactor(String),

    /// Invalid parameter combination.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Interpolation failed.
    #[error("Interpolation failed: {0}")]
    InterpolationFailed(String),

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;
