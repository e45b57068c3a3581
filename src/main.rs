//! Logic Bridge - Benchmark CLI
//!
//! Runs the native-vs-reference experiment. With no arguments the experiment uses
//! the values from logic_bridge.toml (or the built-in defaults). `--values`
//! checks a single given sequence instead.

use anyhow::{Context, Result};
use clap::Parser;
use logic_bridge::config::BridgeConfig;
use logic_bridge::ffi::{Bridge, FfiValue};
use logic_bridge::harness::{check_values, run_experiment, HarnessError};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "logic-bench")]
#[command(version)]
#[command(about = "Verify and benchmark the native count_positives bridge", long_about = None)]
struct Cli {
    /// Config file (default: search for logic_bridge.toml upward from the cwd)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Elements per dataset
    #[arg(long)]
    size: Option<usize>,

    /// Number of runs
    #[arg(long)]
    runs: Option<usize>,

    /// Seed for reproducible datasets
    #[arg(long)]
    seed: Option<u64>,

    /// Path to the native library, bypassing the search
    #[arg(long)]
    library: Option<PathBuf>,

    /// Count this comma- or space-separated list through both implementations
    /// instead of running the experiment
    #[arg(long, value_name = "LIST", allow_hyphen_values = true)]
    values: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BridgeConfig::load_from_cwd().context("Failed to load logic_bridge.toml")?,
    };
    if let Some(size) = cli.size {
        config.experiment.dataset_size = size;
    }
    if let Some(runs) = cli.runs {
        config.experiment.num_runs = runs;
    }
    if cli.seed.is_some() {
        config.experiment.seed = cli.seed;
    }
    if cli.library.is_some() {
        config.library.path = cli.library.clone();
    }
    let verbose = cli.verbose || config.output.verbose;

    let bridge = Bridge::from_config(&config.library);
    if verbose {
        eprintln!("Library: {}", bridge.path().display());
        eprintln!("Signature: {}", bridge.signature());
        match bridge.load_error() {
            None => eprintln!("Status: loaded"),
            Some(cause) => eprintln!("Status: unloaded ({})", cause),
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(list) = &cli.values {
        return match check_values(&bridge, &FfiValue::parse_list(list), &mut out) {
            Ok(check) => {
                out.flush()?;
                Ok(if check.agreed() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Err(HarnessError::BridgeUnavailable(_)) => Ok(ExitCode::SUCCESS),
            Err(e) => Err(e.into()),
        };
    }

    match run_experiment(&bridge, &config.experiment, &mut out) {
        Ok(report) => {
            out.flush()?;
            if report.passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!(
                    "Verification failed: {} of {} runs disagreed with the reference",
                    report.mismatches(),
                    report.records.len()
                );
                Ok(ExitCode::FAILURE)
            }
        }
        // Already reported; a missing library is not a process failure.
        Err(HarnessError::BridgeUnavailable(_)) => Ok(ExitCode::SUCCESS),
        Err(e) => Err(e.into()),
    }
}
