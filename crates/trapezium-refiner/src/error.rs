//! Error types for refinement operations

use crate::config::ConfigError;
use thiserror::Error;
use trapezium_domain::DomainError;
use trapezium_pool::PoolError;

/// Errors that prevent a refinement from starting or completing
#[derive(Error, Debug)]
pub enum RefinerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid interval or partition count
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Worker pool could not run the batch
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),
}
