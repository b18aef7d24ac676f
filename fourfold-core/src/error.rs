//! Structured error types for fourfold.

use thiserror::Error;

/// Unified error type for all fourfold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FourfoldError {
    /// A formula needed to divide by a quantity that is zero.
    #[error("division by zero: {0}")]
    DivideByZero(String),

    /// A value fell outside the domain of a formula (log of a non-positive
    /// number, negative statistic, zero count where a positive one is needed).
    #[error("domain error: {0}")]
    Domain(String),

    /// Invalid input (bad arguments, out-of-range options)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl FourfoldError {
    /// Whether this is an arithmetic failure (division by zero or a domain
    /// violation) rather than a caller mistake.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::DivideByZero(_) | Self::Domain(_))
    }
}

/// Convenience alias used throughout fourfold.
pub type Result<T> = std::result::Result<T, FourfoldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        let e = FourfoldError::DivideByZero("expected_frequencies: n = 0".into());
        assert_eq!(e.to_string(), "division by zero: expected_frequencies: n = 0");
        let e = FourfoldError::Domain("ln(0)".into());
        assert_eq!(e.to_string(), "domain error: ln(0)");
    }

    #[test]
    fn arithmetic_classification() {
        assert!(FourfoldError::DivideByZero(String::new()).is_arithmetic());
        assert!(FourfoldError::Domain(String::new()).is_arithmetic());
        assert!(!FourfoldError::InvalidInput(String::new()).is_arithmetic());
        assert!(!FourfoldError::Other(String::new()).is_arithmetic());
    }
}
