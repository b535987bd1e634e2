//! CLI argument definitions and parsing.

use crate::config::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Trapezium - integrate a function with the parallel composite trapezoidal rule.
///
/// Refines the partition count one step at a time until two consecutive
/// estimates agree to the requested number of decimal places.
#[derive(Debug, Parser)]
#[command(name = "trapezium")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TRAPEZIUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Lower integration bound
    #[arg(long, allow_hyphen_values = true)]
    pub lower: Option<f64>,

    /// Upper integration bound
    #[arg(long, allow_hyphen_values = true)]
    pub upper: Option<f64>,

    /// Number of concurrent workers (default: available cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Decimal digits two consecutive estimates must agree on
    #[arg(short, long)]
    pub precision: Option<u32>,

    /// Iteration cap before giving up
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Function to integrate
    #[arg(long, value_enum)]
    pub function: Option<FunctionKind>,

    /// Polynomial coefficients in ascending power order, e.g. 0.5,3,2
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub coefficients: Option<Vec<f64>>,

    /// Skip refinement and compute a single estimate with N partitions
    #[arg(long, value_name = "N")]
    pub fixed: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// One line per iteration plus a summary (default)
    Text,
    /// Full outcome as JSON
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => OutputFormat::Text,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

/// Functions selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FunctionKind {
    /// Polynomial given by --coefficients (default 2x^2 + 3x + 0.5)
    Polynomial,
    /// sin(x)
    Sin,
    /// e^x
    Exp,
    /// sqrt(x)
    Sqrt,
    /// 1/x
    Reciprocal,
}
