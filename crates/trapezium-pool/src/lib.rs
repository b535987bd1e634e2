//! Trapezium Worker Pool
//!
//! Bounded parallel executor for trapezoid tasks.
//!
//! # Overview
//!
//! A [`WorkerPool`] runs one batch of [`TrapezoidTask`](trapezium_domain::TrapezoidTask)s
//! per call to [`WorkerPool::execute`]:
//! - At most `workers` blocking threads run at once, each pulling the next
//!   task index from a shared cursor
//! - Results come back in submission order, one [`PartialResult`](trapezium_domain::PartialResult)
//!   per task; a failing task never aborts the batch
//! - The caller blocks on a full barrier until every task has reported, or
//!   until its [`Interrupt`] fires
//! - Every worker is joined before `execute` returns, on every exit path
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use trapezium_domain::{Evaluator, Interval};
//! use trapezium_pool::{Interrupt, WorkerPool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = WorkerPool::with_available_parallelism()?;
//!     let f: Arc<dyn Evaluator> = Arc::new(|x: f64| x * x);
//!     let (trigger, mut interrupt) = Interrupt::channel();
//!
//!     // Ctrl+C aborts the batch
//!     tokio::spawn(async move {
//!         if tokio::signal::ctrl_c().await.is_ok() {
//!             trigger.trigger();
//!         }
//!     });
//!
//!     let tasks = Interval::new(0.0, 1.0)?.partition(1_000)?;
//!     let results = pool.execute(tasks, Some(f), &mut interrupt).await?;
//!     println!("{} partial areas", results.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod error;
mod interrupt;
mod pool;

pub use error::PoolError;
pub use interrupt::{Interrupt, InterruptTrigger};
pub use pool::WorkerPool;
