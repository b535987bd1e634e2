//! Bounded executor for trapezoid tasks

use crate::{Interrupt, PoolError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use trapezium_domain::{Evaluator, FailureKind, PartialResult, TaskFailure, TrapezoidTask};

/// Fixed-size pool of blocking workers
///
/// Workers are created per [`execute`](Self::execute) call and all of them
/// are joined before it returns, so nothing outlives a batch.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use trapezium_domain::{AreaEstimate, Evaluator, Interval};
/// use trapezium_pool::{Interrupt, WorkerPool};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = WorkerPool::new(4)?;
/// let f: Arc<dyn Evaluator> = Arc::new(|x: f64| 2.0 * x);
/// let tasks = Interval::new(0.0, 1.0)?.partition(10)?;
///
/// let results = pool.execute(tasks, Some(f), &mut Interrupt::never()).await?;
/// let estimate = AreaEstimate::reduce(&results);
/// assert!((estimate.area - 1.0).abs() < 1e-12);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with `workers` concurrent workers
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Unavailable`] if `workers` is zero.
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::Unavailable(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(Self { workers })
    }

    /// Create a pool sized to the number of available processing units
    pub fn with_available_parallelism() -> Result<Self, PoolError> {
        let workers = std::thread::available_parallelism()
            .map_err(|e| {
                PoolError::Unavailable(format!("cannot determine available parallelism: {}", e))
            })?
            .get();
        Self::new(workers)
    }

    /// Maximum number of concurrent workers
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every task and return one result per task, in submission order
    ///
    /// Blocks until all tasks have reported (a full barrier) or until
    /// `interrupt` fires. On interrupt the remaining tasks are abandoned,
    /// every worker is joined, and [`PoolError::Interrupted`] is returned
    /// without any partial results.
    ///
    /// A worker that dies mid-batch does not fail the call: the tasks it
    /// never reported come back as [`FailureKind::Unexpected`] failures.
    pub async fn execute(
        &self,
        tasks: Vec<TrapezoidTask>,
        evaluator: Option<Arc<dyn Evaluator>>,
        interrupt: &mut Interrupt,
    ) -> Result<Vec<PartialResult>, PoolError> {
        let total = tasks.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let tasks: Arc<[TrapezoidTask]> = tasks.into();
        let cursor = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, PartialResult)>();

        let worker_count = self.workers.min(total);
        let mut workers = JoinSet::new();
        for _ in 0..worker_count {
            let tasks = Arc::clone(&tasks);
            let cursor = Arc::clone(&cursor);
            let stop = Arc::clone(&stop);
            let evaluator = evaluator.clone();
            let tx = tx.clone();

            workers.spawn_blocking(move || {
                let mut executed = 0usize;
                while !stop.load(Ordering::Acquire) {
                    let index = cursor.fetch_add(1, Ordering::AcqRel);
                    let Some(task) = tasks.get(index) else {
                        break;
                    };
                    let result = task.run(evaluator.as_deref());
                    executed += 1;
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
                executed
            });
        }
        // Only workers hold senders now; the channel closes when they all exit.
        drop(tx);

        tracing::debug!(total, workers = worker_count, "Batch submitted");

        let mut slots: Vec<Option<PartialResult>> = vec![None; total];
        let mut completed = 0usize;

        loop {
            tokio::select! {
                biased;

                _ = interrupt.triggered() => {
                    stop.store(true, Ordering::Release);
                    rx.close();
                    join_workers(&mut workers).await;
                    tracing::warn!(completed, total, "Batch interrupted, workers released");
                    return Err(PoolError::Interrupted { completed, total });
                }
                received = rx.recv() => match received {
                    Some((index, result)) => {
                        slots[index] = Some(result);
                        completed += 1;
                    }
                    None => break,
                },
            }
        }

        let executed = join_workers(&mut workers).await;

        let results: Vec<PartialResult> = slots
            .into_iter()
            .zip(tasks.iter())
            .map(|(slot, task)| {
                slot.unwrap_or_else(|| {
                    tracing::error!(x1 = task.x1, x2 = task.x2, "Task never reported a result");
                    PartialResult::Failed(TaskFailure::new(
                        FailureKind::Unexpected,
                        task.x1,
                        task.x2,
                        "worker exited before reporting this task",
                    ))
                })
            })
            .collect();

        tracing::debug!(
            total,
            executed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch completed"
        );

        Ok(results)
    }
}

/// Wait for every worker to exit, logging any that died
async fn join_workers(workers: &mut JoinSet<usize>) -> usize {
    let mut executed = 0;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(count) => executed += count,
            Err(e) if e.is_panic() => tracing::error!("Worker panicked: {}", e),
            Err(e) => tracing::error!("Worker did not complete: {}", e),
        }
    }
    executed
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapezium_domain::{AreaEstimate, EvaluationError, Interval};

    fn linear() -> Arc<dyn Evaluator> {
        Arc::new(|x: f64| x)
    }

    struct FailAt(f64);

    impl Evaluator for FailAt {
        fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
            if x == self.0 {
                Err(EvaluationError::Domain {
                    x,
                    reason: "injected".to_string(),
                })
            } else {
                Ok(1.0)
            }
        }
    }

    #[test]
    fn test_zero_workers_unavailable() {
        assert!(matches!(WorkerPool::new(0), Err(PoolError::Unavailable(_))));
    }

    #[test]
    fn test_available_parallelism() {
        let pool = WorkerPool::with_available_parallelism().unwrap();
        assert!(pool.workers() >= 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let pool = WorkerPool::new(2).unwrap();
        let results = pool
            .execute(Vec::new(), Some(linear()), &mut Interrupt::never())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_results_in_submission_order() {
        let pool = WorkerPool::new(3).unwrap();
        let tasks = Interval::new(0.0, 10.0).unwrap().partition(10).unwrap();

        let results = pool
            .execute(tasks, Some(linear()), &mut Interrupt::never())
            .await
            .unwrap();

        // Task i over [i, i+1] under f(x) = x has area i + 0.5
        let areas: Vec<f64> = results.iter().map(|r| r.contribution()).collect();
        let expected: Vec<f64> = (0..10).map(|i| i as f64 + 0.5).collect();
        assert_eq!(areas, expected);
    }

    #[tokio::test]
    async fn test_more_workers_than_tasks() {
        let pool = WorkerPool::new(16).unwrap();
        let tasks = Interval::new(0.0, 2.0).unwrap().partition(2).unwrap();
        let results = pool
            .execute(tasks, Some(linear()), &mut Interrupt::never())
            .await
            .unwrap();
        assert_eq!(AreaEstimate::reduce(&results).area, 2.0);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let pool = WorkerPool::new(2).unwrap();
        let tasks = Interval::new(0.0, 4.0).unwrap().partition(4).unwrap();
        let f: Arc<dyn Evaluator> = Arc::new(FailAt(0.0));

        let results = pool
            .execute(tasks, Some(f), &mut Interrupt::never())
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(
            results[0].failure().unwrap().kind,
            FailureKind::EvaluationFailure
        );
        assert!(results[1..].iter().all(|r| *r == PartialResult::Area(1.0)));
    }

    #[tokio::test]
    async fn test_missing_evaluator_fails_every_task() {
        let pool = WorkerPool::new(2).unwrap();
        let tasks = Interval::new(0.0, 1.0).unwrap().partition(5).unwrap();

        let results = pool
            .execute(tasks, None, &mut Interrupt::never())
            .await
            .unwrap();

        let estimate = AreaEstimate::reduce(&results);
        assert!(estimate.is_total_failure());
        assert!(estimate
            .failures
            .iter()
            .all(|f| f.kind == FailureKind::MissingDependency));
    }

    #[tokio::test]
    async fn test_pre_triggered_interrupt_aborts() {
        let pool = WorkerPool::new(2).unwrap();
        let tasks = Interval::new(0.0, 1.0).unwrap().partition(100).unwrap();
        let (trigger, mut interrupt) = Interrupt::channel();
        trigger.trigger();

        let err = pool
            .execute(tasks, Some(linear()), &mut interrupt)
            .await
            .unwrap_err();

        assert!(matches!(err, PoolError::Interrupted { total: 100, .. }));
    }
}
