//! Trapezium Refiner
//!
//! Adaptive refinement of the composite trapezoidal rule.
//!
//! # Overview
//!
//! The [`Refiner`] evaluates the integral of a function over `[lower, upper]`
//! with `n = 1, 2, 3, ...` equal-width trapezoids, fanning each iteration out
//! to a bounded worker pool, until two consecutive estimates agree when
//! rounded to `precision_digits` decimal places.
//!
//! ## State Machine
//!
//! | State | Entered when | Next |
//! |-------|--------------|------|
//! | **Running** | The run starts | Running, Converged or Aborted |
//! | **Converged** | Two consecutive clean estimates round equal | terminal |
//! | **Aborted** | Interrupt, iteration cap, persistent failures, setup error | terminal |
//!
//! An iteration with failed tasks is *degraded*: it is reported with its
//! failure markers, but it is never compared for convergence and never
//! becomes the reported area.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use trapezium_domain::{Evaluator, Polynomial};
//! use trapezium_pool::Interrupt;
//! use trapezium_refiner::{refine, IterationReport, RefinerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let f: Arc<dyn Evaluator> = Arc::new(Polynomial::new(vec![0.5, 3.0, 2.0]));
//!     let mut reports: Vec<IterationReport> = Vec::new();
//!
//!     let outcome = refine(
//!         RefinerConfig::default(),
//!         Some(f),
//!         &mut Interrupt::never(),
//!         &mut reports,
//!     )
//!     .await;
//!
//!     for report in &reports {
//!         println!("N = {} -> area = {:.6}", report.partitions, report.area);
//!     }
//!     println!("{:?}: {}", outcome.state, outcome.reason);
//!     println!("\n{}", outcome.metrics.summary());
//! }
//! ```
//!
//! ## Configuration Presets
//!
//! ```
//! use trapezium_refiner::RefinerConfig;
//!
//! // Default: [2, 20], 4 decimal digits, every available core
//! let config = RefinerConfig::default();
//!
//! // Coarse: 2 decimal digits, lower iteration cap
//! let config = RefinerConfig::coarse();
//!
//! // Fine: 6 decimal digits
//! let config = RefinerConfig::fine();
//! ```
//!
//! # Configuration
//!
//! ```toml
//! lower = 2.0
//! upper = 20.0
//! workers = 8
//! initial_partitions = 1
//! precision_digits = 4
//! max_iterations = 100000
//! max_degraded_streak = 10
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod refiner;
mod report;

pub use config::{ConfigError, RefinerConfig};
pub use error::RefinerError;
pub use metrics::RefinementMetrics;
pub use refiner::{refine, Refiner};
pub use report::{
    IterationReport, ProgressSink, RefinementOutcome, RefinementState, TerminationReason,
};
