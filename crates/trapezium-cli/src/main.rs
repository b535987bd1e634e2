//! Trapezium CLI - integrate a function with the parallel composite trapezoidal rule.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use trapezium_cli::{Cli, Config, ConsoleProgress, Formatter};
use trapezium_pool::Interrupt;
use trapezium_refiner::{refine, RefinementState, Refiner, TerminationReason};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing (log to stderr, RUST_LOG wins over -v)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(&cli).context("Invalid command-line arguments")?;
    config.validate().context("Invalid configuration")?;

    let formatter = Formatter::new(config.output.format, config.output.color);
    let interval = config.refiner.interval()?;
    let exact = config.function.exact_integral(&interval);
    let evaluator = config.function.evaluator();

    // Ctrl+C interrupts the iteration in flight
    let (trigger, mut interrupt) = Interrupt::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current wait");
            trigger.trigger();
        }
    });

    if let Some(partitions) = cli.fixed {
        let function = evaluator.describe();
        let mut refiner = Refiner::new(config.refiner.clone(), Some(evaluator))?;
        let report = refiner
            .integrate_fixed(partitions, &mut interrupt)
            .await
            .context("Fixed-partition estimate failed")?;
        println!("{}", formatter.fixed(&function, &report, exact)?);
        return Ok(if report.is_degraded() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let started = Instant::now();
    let mut progress = ConsoleProgress::new(&formatter);
    let outcome = refine(config.refiner.clone(), Some(evaluator), &mut interrupt, &mut progress).await;
    println!("{}", formatter.outcome(&outcome, exact, started.elapsed())?);

    Ok(match (&outcome.state, &outcome.reason) {
        (RefinementState::Converged, _) => ExitCode::SUCCESS,
        (_, TerminationReason::Interrupted) => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    })
}
