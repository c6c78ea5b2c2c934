//! Error types for unit operations.

use thiserror::Error;

/// Errors that can occur while parsing or converting units.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum UnitError {
    /// The two units do not share a dimension.
    #[error("Incompatible units: cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    /// Symbol is not a registered unit (with or without prefix).
    #[error("Unknown unit symbol: {0}")]
    UnknownUnit(String),

    /// Malformed unit expression.
    #[error("Invalid unit expression '{input}': {message}")]
    Parse { input: String, message: String },
}

impl UnitError {
    /// Create an incompatible-units error from two displayable units.
    pub fn incompatible(from: impl ToString, to: impl ToString) -> Self {
        Self::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Create a parse error for an expression.
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// Result type for unit operations.
pub type UnitResult<T> = Result<T, UnitError>;
