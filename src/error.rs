/// Error types for the pricing engine
/// Client-facing failures plus the internal catch-all

use thiserror::Error;

/// Errors raised while building a scenario or running an analysis on it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Missing or malformed input field
    #[error("{0}")]
    Validation(String),

    /// Mathematically undefined operation (zero divisor, infeasible bounds)
    #[error("Domain error: {0}")]
    Domain(String),

    /// Sensitivity analysis referenced a field that is not tunable
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: need at least {required} historical demand points, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Solver could not produce a trustworthy optimum
    #[error("Optimization failed: {0}")]
    OptimizationFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PricingError {
    /// Everything except `Internal` is caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PricingError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;
