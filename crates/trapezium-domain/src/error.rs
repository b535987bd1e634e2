//! Error types for domain construction and function evaluation

use thiserror::Error;

/// Errors raised while building domain values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Interval bounds are non-finite or not strictly increasing
    #[error("Invalid interval [{lower}, {upper}]: {reason}")]
    InvalidInterval {
        /// Requested lower bound
        lower: f64,
        /// Requested upper bound
        upper: f64,
        /// Why the bounds were rejected
        reason: String,
    },

    /// Partition count must be at least 1
    #[error("Invalid partition count: {0} (must be positive)")]
    InvalidPartitionCount(usize),
}

/// Errors reported by an [`Evaluator`](crate::Evaluator)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The function produced NaN or an infinity
    #[error("f({x}) is not finite ({value})")]
    NonFinite {
        /// Input point
        x: f64,
        /// Offending output
        value: f64,
    },

    /// The input lies outside the function's domain
    #[error("x = {x} is outside the function domain: {reason}")]
    Domain {
        /// Input point
        x: f64,
        /// Domain restriction that was violated
        reason: String,
    },

    /// The function panicked while evaluating
    #[error("evaluation of f({x}) panicked: {message}")]
    Panicked {
        /// Input point
        x: f64,
        /// Panic payload, when it was a string
        message: String,
    },
}
