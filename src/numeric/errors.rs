// ============================================================================
// Numeric Errors
// Error types for tick/lot arithmetic
// ============================================================================

use thiserror::Error;

/// Errors that can occur during checked tick/lot arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericError {
    /// Result exceeded u64::MAX
    #[error("arithmetic overflow: result exceeded maximum value")]
    Overflow,
    /// Subtraction would go below zero
    #[error("arithmetic underflow: result below zero")]
    Underflow,
    /// Scale could not be applied to a decimal
    #[error("scale conversion failed")]
    InvalidScale,
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;
