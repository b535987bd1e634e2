//! Single-trapezoid work unit

use crate::{evaluate_guarded, Evaluator, FailureKind, PartialResult, TaskFailure};
use serde::{Deserialize, Serialize};

/// Area of one trapezoid `[x1, x2]` under `f`
///
/// Produced fresh for every iteration and moved into the worker that runs it.
/// Fields are public so callers can describe work that did not come from
/// [`Interval::partition`](crate::Interval::partition); [`run`](Self::run)
/// validates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidTask {
    /// Left endpoint
    pub x1: f64,
    /// Right endpoint
    pub x2: f64,
    /// Shared subinterval width
    pub width: f64,
}

impl TrapezoidTask {
    /// Create a task description
    pub fn new(x1: f64, x2: f64, width: f64) -> Self {
        Self { x1, x2, width }
    }

    /// Compute `(width / 2) * (f(x1) + f(x2))`
    ///
    /// Never panics and never returns NaN as an area: invalid widths, a
    /// missing evaluator, and failed evaluations all come back as
    /// [`PartialResult::Failed`] with the matching [`FailureKind`].
    ///
    /// # Examples
    ///
    /// ```
    /// use trapezium_domain::{FailureKind, PartialResult, TrapezoidTask};
    ///
    /// let f = |x: f64| x;
    /// let task = TrapezoidTask::new(0.0, 2.0, 2.0);
    /// assert_eq!(task.run(Some(&f)), PartialResult::Area(2.0));
    ///
    /// let result = TrapezoidTask::new(0.0, 2.0, 2.0).run(None);
    /// assert_eq!(result.failure().unwrap().kind, FailureKind::MissingDependency);
    /// ```
    pub fn run(&self, evaluator: Option<&dyn Evaluator>) -> PartialResult {
        let result = self.compute(evaluator);

        if let PartialResult::Failed(failure) = &result {
            tracing::warn!(
                x1 = self.x1,
                x2 = self.x2,
                width = self.width,
                kind = ?failure.kind,
                "Trapezoid task failed: {}",
                failure.reason
            );
        }

        result
    }

    fn compute(&self, evaluator: Option<&dyn Evaluator>) -> PartialResult {
        if !(self.width > 0.0) || !self.width.is_finite() {
            return self.fail(
                FailureKind::InvalidArgument,
                format!("trapezoid width must be positive and finite (got {})", self.width),
            );
        }

        let Some(f) = evaluator else {
            return self.fail(FailureKind::MissingDependency, "no evaluator supplied");
        };

        let (y1, y2) = match (evaluate_guarded(f, self.x1), evaluate_guarded(f, self.x2)) {
            (Ok(y1), Ok(y2)) => (y1, y2),
            (Err(e), _) | (_, Err(e)) => {
                return self.fail(FailureKind::EvaluationFailure, e.to_string());
            }
        };

        let area = (self.width / 2.0) * (y1 + y2);
        if !area.is_finite() {
            return self.fail(
                FailureKind::EvaluationFailure,
                format!("trapezoid area overflowed (f(x1) = {}, f(x2) = {})", y1, y2),
            );
        }

        PartialResult::Area(area)
    }

    fn fail(&self, kind: FailureKind, reason: impl Into<String>) -> PartialResult {
        PartialResult::Failed(TaskFailure::new(kind, self.x1, self.x2, reason))
    }
}
