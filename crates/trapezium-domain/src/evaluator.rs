//! The function-under-integration contract
//!
//! An [`Evaluator`] is anything that can turn an `x` into `f(x)` or say why it
//! could not. Plain closures qualify through a blanket impl.

use crate::EvaluationError;
use std::panic::{self, AssertUnwindSafe};

/// A scalar function `f: f64 -> f64` that may fail
///
/// Implementations must be shareable across worker threads.
pub trait Evaluator: Send + Sync {
    /// Evaluate the function at `x`
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError>;

    /// Human-readable description of the function
    fn describe(&self) -> String {
        "f(x)".to_string()
    }
}

impl<F> Evaluator for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        let value = self(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::NonFinite { x, value })
        }
    }
}

/// Evaluate `f(x)` without letting a panic or a non-finite value escape
///
/// Panics inside the function are caught and converted to
/// [`EvaluationError::Panicked`]. Every failure is logged on the error
/// channel before being returned.
pub fn evaluate_guarded(evaluator: &dyn Evaluator, x: f64) -> Result<f64, EvaluationError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(x)));

    let result = match outcome {
        Ok(Ok(value)) if !value.is_finite() => Err(EvaluationError::NonFinite { x, value }),
        Ok(result) => result,
        Err(payload) => Err(EvaluationError::Panicked {
            x,
            message: panic_message(payload.as_ref()),
        }),
    };

    if let Err(e) = &result {
        tracing::error!(x, function = %evaluator.describe(), "Evaluation failed: {}", e);
    }

    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
