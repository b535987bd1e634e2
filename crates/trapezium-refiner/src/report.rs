//! Iteration reports, terminal outcomes and progress hooks

use crate::RefinementMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use trapezium_domain::{Interval, RunId, TaskFailure};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementState {
    /// Iterations are still being run
    Running,
    /// Two consecutive clean estimates agreed
    Converged,
    /// Stopped without converging
    Aborted,
}

impl RefinementState {
    /// No further iterations happen from this state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RefinementState::Running)
    }
}

/// Why a run stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TerminationReason {
    /// The estimate stopped changing at the configured precision
    Converged {
        /// Decimal digits compared
        digits: u32,
    },
    /// The wait for an iteration's results was interrupted
    Interrupted,
    /// `max_iterations` iterations ran without converging
    IterationLimit {
        /// Configured cap
        max_iterations: usize,
    },
    /// Too many consecutive iterations had failed tasks
    PersistentFailures {
        /// Length of the degraded streak
        streak: usize,
    },
    /// The run could not start (bad interval, no worker pool)
    Setup {
        /// Diagnostic message
        message: String,
    },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Converged { digits } => {
                write!(f, "the area no longer changes in {} decimal places", digits)
            }
            TerminationReason::Interrupted => write!(f, "the run was interrupted"),
            TerminationReason::IterationLimit { max_iterations } => {
                write!(f, "no convergence after {} iterations", max_iterations)
            }
            TerminationReason::PersistentFailures { streak } => {
                write!(f, "{} consecutive iterations had failed tasks", streak)
            }
            TerminationReason::Setup { message } => write!(f, "the run could not start: {}", message),
        }
    }
}

/// Result of one iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationReport {
    /// 1-based iteration number within the run
    pub iteration: usize,
    /// Partition count `n`
    pub partitions: usize,
    /// Subinterval width
    pub width: f64,
    /// Sum of successful task areas
    pub area: f64,
    /// `area` rounded to the configured precision
    pub rounded: f64,
    /// Tasks that produced an area
    pub contributing: usize,
    /// Failure markers for this iteration, in task order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TaskFailure>,
    /// Wall-clock time for the iteration, in microseconds
    pub elapsed_us: u64,
}

impl IterationReport {
    /// At least one task failed
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of failed tasks
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementOutcome {
    /// Run identifier used in diagnostics
    pub run_id: RunId,
    /// Description of the integrated function
    pub function: String,
    /// Integration bounds, if they were valid
    pub interval: Option<Interval>,
    /// Terminal state
    pub state: RefinementState,
    /// Why the run stopped
    pub reason: TerminationReason,
    /// Converged area, or the last clean area when aborted
    pub area: Option<f64>,
    /// Partition count that produced `area`
    pub partitions: Option<usize>,
    /// Every completed iteration, in order
    pub iterations: Vec<IterationReport>,
    /// Metrics at the end of the run
    pub metrics: RefinementMetrics,
}

impl RefinementOutcome {
    /// The run converged
    pub fn is_converged(&self) -> bool {
        self.state == RefinementState::Converged
    }
}

/// Receives progress while a run is in flight
///
/// Both hooks default to doing nothing.
pub trait ProgressSink {
    /// Called after every completed iteration
    fn iteration(&mut self, _report: &IterationReport) {}

    /// Called once with the terminal outcome
    fn finished(&mut self, _outcome: &RefinementOutcome) {}
}

/// Discards all progress
impl ProgressSink for () {}

/// Collects reports, mostly useful in tests
impl ProgressSink for Vec<IterationReport> {
    fn iteration(&mut self, report: &IterationReport) {
        self.push(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapezium_domain::FailureKind;

    fn report(failures: Vec<TaskFailure>) -> IterationReport {
        IterationReport {
            iteration: 1,
            partitions: 1,
            width: 18.0,
            area: 7875.0,
            rounded: 7875.0,
            contributing: 1,
            failures,
            elapsed_us: 10,
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RefinementState::Running.is_terminal());
        assert!(RefinementState::Converged.is_terminal());
        assert!(RefinementState::Aborted.is_terminal());
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            TerminationReason::Converged { digits: 4 }.to_string(),
            "the area no longer changes in 4 decimal places"
        );
        assert!(TerminationReason::IterationLimit { max_iterations: 9 }
            .to_string()
            .contains("9 iterations"));
    }

    #[test]
    fn test_report_degraded() {
        assert!(!report(Vec::new()).is_degraded());

        let degraded = report(vec![TaskFailure::new(
            FailureKind::EvaluationFailure,
            0.0,
            1.0,
            "NaN",
        )]);
        assert!(degraded.is_degraded());
        assert_eq!(degraded.failed(), 1);
    }

    #[test]
    fn test_clean_report_omits_failures_in_json() {
        let json = serde_json::to_value(report(Vec::new())).unwrap();
        assert!(json.get("failures").is_none());
        assert_eq!(json["partitions"], 1);
    }

    #[test]
    fn test_reason_json_shape() {
        let json = serde_json::to_value(TerminationReason::PersistentFailures { streak: 3 }).unwrap();
        assert_eq!(json["reason"], "persistent_failures");
        assert_eq!(json["streak"], 3);

        let json = serde_json::to_value(TerminationReason::Interrupted).unwrap();
        assert_eq!(json["reason"], "interrupted");
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<IterationReport> = Vec::new();
        sink.iteration(&report(Vec::new()));
        sink.iteration(&report(Vec::new()));
        assert_eq!(sink.len(), 2);
    }
}
