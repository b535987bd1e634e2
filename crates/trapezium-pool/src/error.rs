//! Error types for pool operations

use thiserror::Error;

/// Errors that can occur while creating or running the pool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool cannot be created with the requested resources
    #[error("Worker pool unavailable: {0}")]
    Unavailable(String),

    /// The wait for results was interrupted; the batch was abandoned
    #[error("Execution interrupted after {completed}/{total} tasks")]
    Interrupted {
        /// Tasks that had reported before the interrupt
        completed: usize,
        /// Tasks submitted
        total: usize,
    },
}
