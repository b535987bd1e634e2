//! Metrics collection for refinement runs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use trapezium_domain::{AreaEstimate, FailureKind};

/// Counters accumulated across the iterations of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinementMetrics {
    /// Iterations that produced an estimate
    pub iterations: usize,

    /// Iterations with at least one failed task
    pub degraded_iterations: usize,

    /// Iterations abandoned because the wait was interrupted
    pub interrupted_iterations: usize,

    /// Tasks that produced an area
    pub tasks_succeeded: usize,

    /// Failed tasks by category
    pub failures: HashMap<FailureKind, usize>,

    /// Wall-clock time spent in iterations, in milliseconds
    pub total_runtime_ms: u64,
}

impl RefinementMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed iteration
    pub fn record_iteration(&mut self, estimate: &AreaEstimate, elapsed: Duration) {
        self.iterations += 1;
        self.tasks_succeeded += estimate.contributing;
        if estimate.is_degraded() {
            self.degraded_iterations += 1;
        }
        for failure in &estimate.failures {
            *self.failures.entry(failure.kind).or_insert(0) += 1;
        }
        self.record_runtime(elapsed);
    }

    /// Record an iteration that was interrupted before completing
    pub fn record_interrupt(&mut self, elapsed: Duration) {
        self.interrupted_iterations += 1;
        self.record_runtime(elapsed);
    }

    fn record_runtime(&mut self, elapsed: Duration) {
        self.total_runtime_ms += elapsed.as_millis() as u64;
    }

    /// Failed tasks across all categories
    pub fn total_failed(&self) -> usize {
        self.failures.values().sum()
    }

    /// All tasks that reported, successful or not
    pub fn total_tasks(&self) -> usize {
        self.tasks_succeeded + self.total_failed()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Refinement Metrics Summary".to_string(),
            "==========================".to_string(),
            format!("Iterations: {}", self.iterations),
            format!("Degraded iterations: {}", self.degraded_iterations),
            format!("Interrupted iterations: {}", self.interrupted_iterations),
            format!("Tasks executed: {}", self.total_tasks()),
            format!("Total runtime: {}ms", self.total_runtime_ms),
        ];

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failures by kind:".to_string());
            let mut kinds: Vec<_> = self.failures.iter().collect();
            kinds.sort_by_key(|(kind, _)| kind.as_str());
            for (kind, count) in kinds {
                lines.push(format!("  {}: {}", kind, count));
            }
            lines.push(format!("  Total: {}", self.total_failed()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapezium_domain::{PartialResult, TaskFailure};

    fn estimate(areas: usize, failures: &[FailureKind]) -> AreaEstimate {
        let mut results: Vec<PartialResult> = (0..areas).map(|_| PartialResult::Area(1.0)).collect();
        results.extend(
            failures
                .iter()
                .map(|kind| PartialResult::Failed(TaskFailure::new(*kind, 0.0, 1.0, "test"))),
        );
        AreaEstimate::reduce(&results)
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = RefinementMetrics::new();
        assert_eq!(metrics.iterations, 0);
        assert_eq!(metrics.total_failed(), 0);
        assert_eq!(metrics.total_tasks(), 0);
    }

    #[test]
    fn test_record_clean_iteration() {
        let mut metrics = RefinementMetrics::new();
        metrics.record_iteration(&estimate(3, &[]), Duration::from_millis(5));

        assert_eq!(metrics.iterations, 1);
        assert_eq!(metrics.degraded_iterations, 0);
        assert_eq!(metrics.tasks_succeeded, 3);
        assert_eq!(metrics.total_runtime_ms, 5);
    }

    #[test]
    fn test_record_degraded_iteration() {
        let mut metrics = RefinementMetrics::new();
        metrics.record_iteration(
            &estimate(2, &[FailureKind::EvaluationFailure, FailureKind::EvaluationFailure]),
            Duration::ZERO,
        );
        metrics.record_iteration(&estimate(0, &[FailureKind::Unexpected]), Duration::ZERO);

        assert_eq!(metrics.iterations, 2);
        assert_eq!(metrics.degraded_iterations, 2);
        assert_eq!(metrics.failures[&FailureKind::EvaluationFailure], 2);
        assert_eq!(metrics.failures[&FailureKind::Unexpected], 1);
        assert_eq!(metrics.total_failed(), 3);
        assert_eq!(metrics.total_tasks(), 5);
    }

    #[test]
    fn test_record_interrupt() {
        let mut metrics = RefinementMetrics::new();
        metrics.record_interrupt(Duration::from_millis(7));
        assert_eq!(metrics.interrupted_iterations, 1);
        assert_eq!(metrics.iterations, 0);
        assert_eq!(metrics.total_runtime_ms, 7);
    }

    #[test]
    fn test_reset() {
        let mut metrics = RefinementMetrics::new();
        metrics.record_iteration(&estimate(1, &[FailureKind::InvalidArgument]), Duration::ZERO);
        metrics.reset();
        assert_eq!(metrics, RefinementMetrics::default());
    }

    #[test]
    fn test_summary() {
        let mut metrics = RefinementMetrics::new();
        metrics.record_iteration(&estimate(4, &[]), Duration::from_millis(3));
        metrics.record_iteration(
            &estimate(3, &[FailureKind::EvaluationFailure]),
            Duration::from_millis(2),
        );

        let summary = metrics.summary();
        assert!(summary.contains("Iterations: 2"));
        assert!(summary.contains("Degraded iterations: 1"));
        assert!(summary.contains("Tasks executed: 8"));
        assert!(summary.contains("Total runtime: 5ms"));
        assert!(summary.contains("evaluation_failure: 1"));
    }
}
