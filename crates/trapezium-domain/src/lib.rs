//! Trapezium Domain Layer
//!
//! Value types and contracts shared by the worker pool and the refinement
//! controller. Nothing in this crate spawns threads or prints; it only
//! describes work and folds results.
//!
//! ## Key Concepts
//!
//! - **Interval**: the fixed integration domain `[lower, upper]`
//! - **Evaluator**: the opaque function being integrated
//! - **TrapezoidTask**: one subinterval of a uniform partition
//! - **PartialResult**: a task's area, or a failure marker with a reason
//! - **AreaEstimate**: the reduction of one iteration's partial results
//! - **ConvergenceState**: rounded comparison of consecutive clean estimates
//!
//! ## Example
//!
//! ```
//! use trapezium_domain::{AreaEstimate, Interval};
//!
//! let interval = Interval::new(0.0, 1.0).unwrap();
//! let f = |x: f64| x * x;
//!
//! let results: Vec<_> = interval
//!     .partition(100)
//!     .unwrap()
//!     .iter()
//!     .map(|task| task.run(Some(&f)))
//!     .collect();
//!
//! let estimate = AreaEstimate::reduce(&results);
//! assert!(!estimate.is_degraded());
//! assert!((estimate.area - 1.0 / 3.0).abs() < 1e-4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convergence;
pub mod error;
pub mod evaluator;
pub mod interval;
pub mod polynomial;
pub mod result;
pub mod run_id;
pub mod task;

// Re-exports for convenience
pub use convergence::{round_to, ConvergenceState};
pub use error::{DomainError, EvaluationError};
pub use evaluator::{evaluate_guarded, Evaluator};
pub use interval::Interval;
pub use polynomial::Polynomial;
pub use result::{AreaEstimate, FailureKind, PartialResult, TaskFailure};
pub use run_id::RunId;
pub use task::TrapezoidTask;
