//! Configuration management for the CLI.
//!
//! A config file has three optional tables:
//!
//! ```toml
//! [refiner]
//! lower = 2.0
//! upper = 20.0
//! precision_digits = 4
//!
//! [function]
//! kind = "polynomial"
//! coefficients = [0.5, 3.0, 2.0]
//!
//! [output]
//! format = "text"
//! color = true
//! ```
//!
//! Command-line flags override file values.

use crate::cli::{Cli, FunctionKind};
use crate::error::{CliError, Result};
use crate::functions::Integrand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trapezium_refiner::RefinerConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Refinement settings
    #[serde(default)]
    pub refiner: RefinerConfig,

    /// Function to integrate
    #[serde(default)]
    pub function: Integrand,

    /// Output settings
    #[serde(default)]
    pub output: Settings,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// JSON document
    Json,
}

impl Config {
    /// Load configuration from `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path)?;
                Self::from_toml_str(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply command-line overrides.
    ///
    /// `--coefficients` only applies to polynomials; combining it with any
    /// other `--function` is rejected.
    pub fn apply_overrides(&mut self, cli: &Cli) -> Result<()> {
        if let Some(lower) = cli.lower {
            self.refiner.lower = lower;
        }
        if let Some(upper) = cli.upper {
            self.refiner.upper = upper;
        }
        if let Some(workers) = cli.workers {
            self.refiner.workers = Some(workers);
        }
        if let Some(precision) = cli.precision {
            self.refiner.precision_digits = precision;
        }
        if let Some(max_iterations) = cli.max_iterations {
            self.refiner.max_iterations = max_iterations;
        }

        match (cli.function, &cli.coefficients) {
            (Some(FunctionKind::Polynomial) | None, Some(coefficients)) => {
                self.function = Integrand::Polynomial {
                    coefficients: coefficients.clone(),
                };
            }
            (Some(kind), Some(_)) => {
                return Err(CliError::InvalidInput(format!(
                    "--coefficients only applies to polynomials, not {}",
                    format!("{:?}", kind).to_lowercase()
                )));
            }
            (Some(FunctionKind::Polynomial), None) => {
                if !matches!(self.function, Integrand::Polynomial { .. }) {
                    self.function = Integrand::default();
                }
            }
            (Some(FunctionKind::Sin), None) => self.function = Integrand::Sin,
            (Some(FunctionKind::Exp), None) => self.function = Integrand::Exp,
            (Some(FunctionKind::Sqrt), None) => self.function = Integrand::Sqrt,
            (Some(FunctionKind::Reciprocal), None) => self.function = Integrand::Reciprocal,
            (None, None) => {}
        }

        if let Some(format) = cli.format {
            self.output.format = format.into();
        }
        if cli.no_color {
            self.output.color = false;
        }
        Ok(())
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<()> {
        self.refiner.validate()?;
        self.function.validate()?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Text,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Text
}
