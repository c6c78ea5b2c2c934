//! Error types for signal operations.

use lib_dsp::DspError;
use lib_units::UnitError;
use thiserror::Error;

/// Errors that can occur while building or transforming signals.
#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    /// Operation needs convertible units and they are not.
    #[error("Incompatible units: cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    /// Unit expression could not be parsed or resolved.
    #[error("Invalid unit: {0}")]
    Unit(UnitError),

    /// Conflicting or invalid sampling period/rate.
    #[error("Inconsistent sampling: {0}")]
    InconsistentSampling(String),

    /// Binary operation on signals with different domains or shapes.
    #[error("Inconsistent signals: {0}")]
    InconsistentSignals(String),

    /// Sample or channel index outside the signal.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Domain interval outside the signal.
    #[error("Range error: {0}")]
    RangeError(String),

    /// Exact domain-value lookup failed.
    #[error("Value not found in domain: {0}")]
    ValueNotFound(String),

    /// Merge or concatenation precondition violated.
    #[error("Merge error: {0}")]
    MergeError(String),

    /// Resampling parameter out of range.
    #[error("Invalid factor: {0}")]
    InvalidFactor(String),

    /// Array lengths disagree.
    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Irregular domain is not finite and non-decreasing.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Numeric backend failure.
    #[error("DSP error: {0}")]
    Dsp(#[from] DspError),
}

impl From<UnitError> for SignalError {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::IncompatibleUnits { from, to } => Self::IncompatibleUnits { from, to },
            other => Self::Unit(other),
        }
    }
}

impl SignalError {
    /// Create a shape mismatch error.
    pub fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Recast unit and domain mismatches as merge failures.
    pub(crate) fn into_merge_error(self) -> Self {
        match self {
            Self::MergeError(_) => self,
            other => Self::MergeError(other.to_string()),
        }
    }
}

/// Result type for signal operations.
pub type SignalResult<T> = Result<T, SignalError>;
