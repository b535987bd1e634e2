//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use std::time::Duration;
use trapezium_refiner::{IterationReport, ProgressSink, RefinementOutcome, RefinementState};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

/// Closed-form comparison for a computed area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Exact value of the integral
    pub exact: f64,
    /// `|area - exact|`
    pub absolute_error: f64,
    /// Absolute error as a percentage of `|exact|`, absent when `exact` is 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_error_pct: Option<f64>,
}

impl ErrorReport {
    /// Compare `area` against `exact`.
    pub fn new(area: f64, exact: f64) -> Self {
        let absolute_error = (area - exact).abs();
        let relative_error_pct = (exact != 0.0).then(|| absolute_error / exact.abs() * 100.0);
        Self {
            exact,
            absolute_error,
            relative_error_pct,
        }
    }
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
    #[serde(flatten)]
    outcome: &'a RefinementOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct JsonFixed<'a> {
    function: &'a str,
    #[serde(flatten)]
    report: &'a IterationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format one refinement iteration as `N = <n> -> area = <area>`.
    pub fn iteration(&self, report: &IterationReport) -> String {
        let line = format!("N = {} -> area = {:.6}", report.partitions, report.area);
        if report.is_degraded() {
            let note = format!(
                "  ({} of {} tasks failed, not compared)",
                report.failed(),
                report.failed() + report.contributing
            );
            format!("{}{}", line, self.colorize(&note, "yellow"))
        } else {
            line
        }
    }

    /// Format the terminal outcome of a refinement run.
    pub fn outcome(
        &self,
        outcome: &RefinementOutcome,
        exact: Option<f64>,
        elapsed: Duration,
    ) -> Result<String> {
        let error = outcome.area.zip(exact).map(|(area, exact)| ErrorReport::new(area, exact));

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonOutcome {
                outcome,
                error,
                elapsed_ms: elapsed.as_micros() as f64 / 1000.0,
            })?),
            OutputFormat::Text => Ok(self.outcome_text(outcome, error, elapsed)),
        }
    }

    fn outcome_text(
        &self,
        outcome: &RefinementOutcome,
        error: Option<ErrorReport>,
        elapsed: Duration,
    ) -> String {
        let mut lines = Vec::new();

        match (&outcome.state, outcome.area, outcome.partitions) {
            (RefinementState::Converged, Some(area), Some(n)) => {
                lines.push(self.success(&format!(
                    "Converged because {}: area = {:.6} with N = {}",
                    outcome.reason, area, n
                )));
            }
            (_, Some(area), Some(n)) => {
                lines.push(self.error(&format!("Aborted because {}", outcome.reason)));
                lines.push(self.warning(&format!(
                    "Last clean estimate: area = {:.6} with N = {}",
                    area, n
                )));
            }
            _ => {
                lines.push(self.error(&format!("Aborted because {}", outcome.reason)));
                lines.push(self.warning("No clean estimate was computed"));
            }
        }

        lines.push(format!("Function: {}", outcome.function));
        if let Some(interval) = &outcome.interval {
            lines.push(format!("Interval: [{}, {}]", interval.lower(), interval.upper()));
        }
        if let Some(error) = error {
            lines.extend(self.error_lines(&error));
        }
        lines.push(format!("Iterations: {}", outcome.iterations.len()));
        let degraded = outcome.metrics.degraded_iterations;
        if degraded > 0 {
            lines.push(self.warning(&format!("Degraded iterations: {}", degraded)));
        }
        lines.push(format!("Elapsed: {:.3} ms", elapsed.as_micros() as f64 / 1000.0));
        lines.push(self.colorize(&format!("Run: {}", outcome.run_id), "cyan"));

        lines.join("\n")
    }

    /// Format a single fixed-partition estimate.
    pub fn fixed(
        &self,
        function: &str,
        report: &IterationReport,
        exact: Option<f64>,
    ) -> Result<String> {
        let error = exact.map(|exact| ErrorReport::new(report.area, exact));

        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(&JsonFixed {
                function,
                report,
                error,
            })?);
        }

        let mut lines = vec![
            format!("Function: {}", function),
            self.iteration(report),
        ];
        if let Some(error) = error {
            lines.extend(self.error_lines(&error));
        }
        for failure in &report.failures {
            lines.push(self.error(&failure.to_string()));
        }
        lines.push(format!(
            "Elapsed: {:.3} ms",
            report.elapsed_us as f64 / 1000.0
        ));

        Ok(lines.join("\n"))
    }

    fn error_lines(&self, error: &ErrorReport) -> Vec<String> {
        let mut lines = vec![
            format!("Exact value: {:.6}", error.exact),
            format!("Absolute error: {:.6e}", error.absolute_error),
        ];
        if let Some(pct) = error.relative_error_pct {
            lines.push(format!("Relative error: {:.6e}%", pct));
        }
        lines
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Prints one line per iteration in text mode; silent in JSON mode.
pub struct ConsoleProgress<'a> {
    formatter: &'a Formatter,
}

impl<'a> ConsoleProgress<'a> {
    /// Create a progress printer.
    pub fn new(formatter: &'a Formatter) -> Self {
        Self { formatter }
    }
}

impl ProgressSink for ConsoleProgress<'_> {
    fn iteration(&mut self, report: &IterationReport) {
        if self.formatter.format() == OutputFormat::Text {
            println!("{}", self.formatter.iteration(report));
        }
    }
}
