//! Refinement controller
//!
//! Runs the composite trapezoidal rule with `n = initial, initial + 1, ...`
//! partitions until two consecutive clean estimates agree to the configured
//! number of decimal digits.

use crate::{
    IterationReport, ProgressSink, RefinementMetrics, RefinementOutcome, RefinementState,
    RefinerConfig, RefinerError, TerminationReason,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use trapezium_domain::{
    round_to, AreaEstimate, ConvergenceState, Evaluator, FailureKind, Interval, RunId,
    TaskFailure,
};
use trapezium_pool::{Interrupt, PoolError, WorkerPool};

/// Refinement controller
///
/// Owns the interval, the worker pool and the function. Iterations run
/// strictly one after another; each one waits for all of its tasks before the
/// next starts.
///
/// # Degraded iterations
///
/// An iteration in which any task failed is reported but never compared for
/// convergence and never replaces the last clean area. The partition count
/// still advances, and `max_degraded_streak` consecutive degraded iterations
/// abort the run.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use trapezium_domain::{Evaluator, Polynomial};
/// use trapezium_pool::Interrupt;
/// use trapezium_refiner::{Refiner, RefinerConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let f: Arc<dyn Evaluator> = Arc::new(Polynomial::new(vec![0.5, 3.0, 2.0]));
/// let mut refiner = Refiner::new(RefinerConfig::default(), Some(f))?;
///
/// let outcome = refiner.run(&mut Interrupt::never(), &mut ()).await;
/// println!("{:?} after {} iterations", outcome.area, outcome.iterations.len());
/// # Ok(())
/// # }
/// ```
pub struct Refiner {
    config: RefinerConfig,
    interval: Interval,
    pool: WorkerPool,
    evaluator: Option<Arc<dyn Evaluator>>,
    metrics: RefinementMetrics,
}

impl Refiner {
    /// Create a refiner, validating the configuration and building the pool
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the pool cannot be
    /// created. A missing evaluator is not an error here: every task will
    /// report it as a failure.
    pub fn new(
        config: RefinerConfig,
        evaluator: Option<Arc<dyn Evaluator>>,
    ) -> Result<Self, RefinerError> {
        config.validate()?;
        let interval = config.interval()?;
        let pool = match config.workers {
            Some(workers) => WorkerPool::new(workers)?,
            None => WorkerPool::with_available_parallelism()?,
        };

        tracing::info!(
            lower = interval.lower(),
            upper = interval.upper(),
            workers = pool.workers(),
            "Refiner ready"
        );

        Ok(Self {
            config,
            interval,
            pool,
            evaluator,
            metrics: RefinementMetrics::new(),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &RefinerConfig {
        &self.config
    }

    /// Integration interval
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Number of concurrent workers
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Metrics accumulated so far
    pub fn metrics(&self) -> &RefinementMetrics {
        &self.metrics
    }

    fn describe_function(&self) -> String {
        self.evaluator
            .as_ref()
            .map(|f| f.describe())
            .unwrap_or_else(|| "<none>".to_string())
    }

    /// Run iterations until a terminal state is reached
    ///
    /// Always returns an outcome; aborted runs carry the last clean area, if
    /// any iteration produced one. Metrics start from zero on every run.
    pub async fn run(
        &mut self,
        interrupt: &mut Interrupt,
        progress: &mut dyn ProgressSink,
    ) -> RefinementOutcome {
        self.metrics.reset();
        let run_id = RunId::new();
        let span = tracing::info_span!("refine", run_id = %run_id);

        let outcome = self
            .iterate(run_id, interrupt, progress)
            .instrument(span)
            .await;

        progress.finished(&outcome);
        outcome
    }

    async fn iterate(
        &mut self,
        run_id: RunId,
        interrupt: &mut Interrupt,
        progress: &mut dyn ProgressSink,
    ) -> RefinementOutcome {
        let digits = self.config.precision_digits;
        let mut state = RefinementState::Running;
        let mut reason = TerminationReason::Converged { digits };
        let mut partitions = self.config.initial_partitions;
        let mut convergence = ConvergenceState::new(digits);
        let mut last_clean: Option<(f64, usize)> = None;
        let mut degraded_streak = 0usize;
        let mut history: Vec<IterationReport> = Vec::new();

        tracing::info!(
            function = %self.describe_function(),
            workers = self.pool.workers(),
            digits,
            "Refinement started"
        );

        while !state.is_terminal() {
            if history.len() >= self.config.max_iterations {
                tracing::warn!(
                    max_iterations = self.config.max_iterations,
                    "Iteration limit reached without convergence"
                );
                state = RefinementState::Aborted;
                reason = TerminationReason::IterationLimit {
                    max_iterations: self.config.max_iterations,
                };
                break;
            }

            let started = Instant::now();
            let estimate = match self.estimate(partitions, interrupt).await {
                Ok(estimate) => estimate,
                Err(RefinerError::Pool(PoolError::Interrupted { completed, total })) => {
                    self.metrics.record_interrupt(started.elapsed());
                    tracing::warn!(
                        partitions,
                        completed,
                        total,
                        "Iteration interrupted, aborting run"
                    );
                    state = RefinementState::Aborted;
                    reason = TerminationReason::Interrupted;
                    break;
                }
                Err(e) => {
                    tracing::error!(partitions, "Iteration failed: {}", e);
                    state = RefinementState::Aborted;
                    reason = TerminationReason::Setup {
                        message: e.to_string(),
                    };
                    break;
                }
            };
            let elapsed = started.elapsed();
            self.metrics.record_iteration(&estimate, elapsed);

            let converged = if estimate.is_degraded() {
                degraded_streak += 1;
                tracing::warn!(
                    partitions,
                    failed = estimate.failed(),
                    total = estimate.total(),
                    "Degraded iteration excluded from convergence check"
                );
                false
            } else {
                degraded_streak = 0;
                last_clean = Some((estimate.area, partitions));
                convergence.observe(estimate.area)
            };

            let report = IterationReport {
                iteration: history.len() + 1,
                partitions,
                width: self.interval.length() / partitions as f64,
                area: estimate.area,
                rounded: round_to(estimate.area, digits),
                contributing: estimate.contributing,
                failures: estimate.failures,
                elapsed_us: elapsed.as_micros() as u64,
            };
            tracing::debug!(partitions, area = report.area, "Iteration completed");
            progress.iteration(&report);
            history.push(report);

            if converged {
                state = RefinementState::Converged;
                reason = TerminationReason::Converged { digits };
            } else if degraded_streak >= self.config.max_degraded_streak {
                tracing::error!(streak = degraded_streak, "Too many degraded iterations, aborting run");
                state = RefinementState::Aborted;
                reason = TerminationReason::PersistentFailures {
                    streak: degraded_streak,
                };
            } else {
                partitions += 1;
            }
        }

        match &state {
            RefinementState::Converged => tracing::info!(
                partitions,
                area = ?last_clean.map(|(area, _)| area),
                iterations = history.len(),
                "Refinement converged"
            ),
            _ => tracing::warn!(
                iterations = history.len(),
                last_area = ?last_clean.map(|(area, _)| area),
                "Refinement aborted: {}",
                reason
            ),
        }

        RefinementOutcome {
            run_id,
            function: self.describe_function(),
            interval: Some(self.interval),
            state,
            reason,
            area: last_clean.map(|(area, _)| area),
            partitions: last_clean.map(|(_, n)| n),
            iterations: history,
            metrics: self.metrics.clone(),
        }
    }

    /// Build, execute and reduce one partition
    ///
    /// Finite task areas can still overflow when summed. A non-finite total
    /// is replaced by 0 and recorded as a failure spanning the interval, so
    /// the iteration is degraded instead of clean.
    async fn estimate(
        &self,
        partitions: usize,
        interrupt: &mut Interrupt,
    ) -> Result<AreaEstimate, RefinerError> {
        let tasks = self.interval.partition(partitions)?;
        let results = self
            .pool
            .execute(tasks, self.evaluator.clone(), interrupt)
            .await?;

        let mut estimate = AreaEstimate::reduce(&results);
        if !estimate.area.is_finite() {
            tracing::warn!(partitions, area = estimate.area, "Sum of task areas is not finite");
            estimate.failures.push(TaskFailure::new(
                FailureKind::EvaluationFailure,
                self.interval.lower(),
                self.interval.upper(),
                format!("sum of task areas is {}", estimate.area),
            ));
            estimate.area = 0.0;
        }
        Ok(estimate)
    }

    /// Single parallel estimate with a fixed partition count
    ///
    /// No refinement loop: the interval is split once into `partitions`
    /// trapezoids and reduced. Failed tasks are reported in the returned
    /// report exactly as in [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Returns an error for a zero partition count or if the wait is
    /// interrupted.
    pub async fn integrate_fixed(
        &mut self,
        partitions: usize,
        interrupt: &mut Interrupt,
    ) -> Result<IterationReport, RefinerError> {
        let started = Instant::now();
        let estimate = match self.estimate(partitions, interrupt).await {
            Ok(estimate) => estimate,
            Err(e) => {
                if matches!(e, RefinerError::Pool(PoolError::Interrupted { .. })) {
                    self.metrics.record_interrupt(started.elapsed());
                }
                return Err(e);
            }
        };
        let elapsed = started.elapsed();
        self.metrics.record_iteration(&estimate, elapsed);

        if estimate.is_degraded() {
            tracing::warn!(
                partitions,
                failed = estimate.failed(),
                "Fixed estimate is degraded"
            );
        }

        Ok(IterationReport {
            iteration: 1,
            partitions,
            width: self.interval.length() / partitions as f64,
            area: estimate.area,
            rounded: round_to(estimate.area, self.config.precision_digits),
            contributing: estimate.contributing,
            failures: estimate.failures,
            elapsed_us: elapsed.as_micros() as u64,
        })
    }
}

/// Build a refiner and run it, folding setup failures into an aborted outcome
///
/// Convenience for callers that only want the outcome: an invalid
/// configuration or an unavailable pool yields
/// [`RefinementState::Aborted`] with [`TerminationReason::Setup`] instead of
/// an error.
pub async fn refine(
    config: RefinerConfig,
    evaluator: Option<Arc<dyn Evaluator>>,
    interrupt: &mut Interrupt,
    progress: &mut dyn ProgressSink,
) -> RefinementOutcome {
    let function = evaluator
        .as_ref()
        .map(|f| f.describe())
        .unwrap_or_else(|| "<none>".to_string());

    match Refiner::new(config.clone(), evaluator) {
        Ok(mut refiner) => refiner.run(interrupt, progress).await,
        Err(e) => {
            tracing::error!("Refinement could not start: {}", e);
            let outcome = RefinementOutcome {
                run_id: RunId::new(),
                function,
                interval: config.interval().ok(),
                state: RefinementState::Aborted,
                reason: TerminationReason::Setup {
                    message: e.to_string(),
                },
                area: None,
                partitions: None,
                iterations: Vec::new(),
                metrics: RefinementMetrics::new(),
            };
            progress.finished(&outcome);
            outcome
        }
    }
}
