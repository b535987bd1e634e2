//! Per-task results and their reduction into an area estimate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a task-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Non-positive width, bad partition count, malformed bounds
    InvalidArgument,
    /// No evaluator was available to the task
    MissingDependency,
    /// The evaluator returned NaN, an infinity, or an error
    EvaluationFailure,
    /// The task was never run because the iteration was interrupted
    Interrupted,
    /// Anything else, e.g. a worker that died mid-batch
    Unexpected,
}

impl FailureKind {
    /// Stable lowercase name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidArgument => "invalid_argument",
            FailureKind::MissingDependency => "missing_dependency",
            FailureKind::EvaluationFailure => "evaluation_failure",
            FailureKind::Interrupted => "interrupted",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure marker carried in place of an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Left endpoint of the failed task
    pub x1: f64,
    /// Right endpoint of the failed task
    pub x2: f64,
    /// Diagnostic message
    pub reason: String,
}

impl TaskFailure {
    /// Create a failure marker for the task spanning `[x1, x2]`
    pub fn new(kind: FailureKind, x1: f64, x2: f64, reason: impl Into<String>) -> Self {
        Self {
            kind,
            x1,
            x2,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in task [x1={:.4}, x2={:.4}]: {}",
            self.kind, self.x1, self.x2, self.reason
        )
    }
}

/// Outcome of a single trapezoid task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum PartialResult {
    /// Finite trapezoid area
    Area(f64),
    /// The task failed; contributes nothing to the sum
    Failed(TaskFailure),
}

impl PartialResult {
    /// Numeric contribution to the running sum (0 for failures)
    pub fn contribution(&self) -> f64 {
        match self {
            PartialResult::Area(area) => *area,
            PartialResult::Failed(_) => 0.0,
        }
    }

    /// The failure marker, if this task failed
    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            PartialResult::Area(_) => None,
            PartialResult::Failed(failure) => Some(failure),
        }
    }

    /// Whether the task produced an area
    pub fn is_area(&self) -> bool {
        matches!(self, PartialResult::Area(_))
    }
}

/// Sum of one iteration's partial results
///
/// Failed tasks add nothing to `area` and are kept in `failures`, so a
/// degraded estimate is always distinguishable from a clean one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaEstimate {
    /// Sum of all successful task areas
    pub area: f64,
    /// Number of tasks that produced an area
    pub contributing: usize,
    /// Failure markers, in task order
    pub failures: Vec<TaskFailure>,
}

impl AreaEstimate {
    /// Fold partial results in submission order
    ///
    /// # Examples
    ///
    /// ```
    /// use trapezium_domain::{AreaEstimate, FailureKind, PartialResult, TaskFailure};
    ///
    /// let results = vec![
    ///     PartialResult::Area(1.5),
    ///     PartialResult::Failed(TaskFailure::new(FailureKind::EvaluationFailure, 1.0, 2.0, "NaN")),
    ///     PartialResult::Area(2.5),
    /// ];
    ///
    /// let estimate = AreaEstimate::reduce(&results);
    /// assert_eq!(estimate.area, 4.0);
    /// assert_eq!(estimate.contributing, 2);
    /// assert!(estimate.is_degraded());
    /// ```
    pub fn reduce(results: &[PartialResult]) -> Self {
        results.iter().fold(Self::default(), |mut estimate, result| {
            match result {
                PartialResult::Area(area) => {
                    estimate.area += area;
                    estimate.contributing += 1;
                }
                PartialResult::Failed(failure) => estimate.failures.push(failure.clone()),
            }
            estimate
        })
    }

    /// Number of failed tasks
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Total number of tasks that were reduced
    pub fn total(&self) -> usize {
        self.contributing + self.failures.len()
    }

    /// At least one task failed
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Every task failed, so `area` carries no information
    pub fn is_total_failure(&self) -> bool {
        self.contributing == 0 && !self.failures.is_empty()
    }
}
