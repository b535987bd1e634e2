//! Trapezium CLI library.
//!
//! Argument parsing, configuration merging, the catalog of integrable
//! functions, and output formatting for the `trapezium` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod functions;
pub mod output;

pub use cli::{Cli, CliFormat, FunctionKind};
pub use config::{Config, OutputFormat};
pub use error::{CliError, Result};
pub use functions::Integrand;
pub use output::{ConsoleProgress, ErrorReport, Formatter};
