//! Verification Harness
//!
//! Runs the bridged native call and the reference implementation side by side
//! on fresh random data, checks that they agree, and times both.
//!
//! A failed bridged call or a disagreement is recorded against its run and the
//! remaining runs still execute. Only an unloaded bridge stops the experiment,
//! and it does so before any native call is attempted.
//!
//! [`check_values`] does the same comparison once, for a caller-supplied
//! dynamically typed sequence.

use std::io::Write;
use std::time::{Duration, Instant};

use rand::distributions::Uniform;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ffi::{Bridge, BridgeError, FfiValue};
use crate::reference;

/// Experiment parameters, the `[experiment]` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Elements per generated dataset
    #[serde(default = "default_dataset_size")]
    pub dataset_size: usize,

    /// Number of runs, each on a fresh dataset
    #[serde(default = "default_num_runs")]
    pub num_runs: usize,

    /// Smallest generated value (inclusive)
    #[serde(default = "default_min_value")]
    pub min_value: i32,

    /// Largest generated value (inclusive)
    #[serde(default = "default_max_value")]
    pub max_value: i32,

    /// Seed for reproducible datasets; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_dataset_size() -> usize {
    100_000
}

fn default_num_runs() -> usize {
    5
}

fn default_min_value() -> i32 {
    -100
}

fn default_max_value() -> i32 {
    100
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset_size: default_dataset_size(),
            num_runs: default_num_runs(),
            min_value: default_min_value(),
            max_value: default_max_value(),
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Config for `dataset_size` elements over `num_runs` runs, defaults elsewhere
    pub fn new(dataset_size: usize, num_runs: usize) -> Self {
        Self {
            dataset_size,
            num_runs,
            ..Self::default()
        }
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

/// Reasons an experiment stops before completing its runs
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("experiment aborted: {0}")]
    BridgeUnavailable(BridgeError),

    #[error("invalid value range: min {min} is greater than max {max}")]
    InvalidRange { min: i32, max: i32 },

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened on the bridged side of one run
#[derive(Debug, Clone, PartialEq)]
pub enum IterationOutcome {
    /// Native and reference agree
    Verified { native_count: i32, native_time: Duration },
    /// Native and reference disagree
    Mismatch { native_count: i32, native_time: Duration },
    /// The bridged call returned an error; no comparison was made
    BridgeFailed(BridgeError),
}

/// One run of the experiment
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// 1-based run number
    pub run: usize,
    pub reference_count: usize,
    pub reference_time: Duration,
    pub outcome: IterationOutcome,
}

impl IterationRecord {
    /// Duration of the bridged call, when it succeeded
    pub fn native_time(&self) -> Option<Duration> {
        match self.outcome {
            IterationOutcome::Verified { native_time, .. }
            | IterationOutcome::Mismatch { native_time, .. } => Some(native_time),
            IterationOutcome::BridgeFailed(_) => None,
        }
    }
}

/// Results of [`run_experiment`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentReport {
    pub records: Vec<IterationRecord>,
}

impl ExperimentReport {
    /// Mean reference time over all runs
    pub fn mean_reference(&self) -> Option<Duration> {
        mean(self.records.iter().map(|r| r.reference_time))
    }

    /// Mean native time over successful bridged calls only
    pub fn mean_native(&self) -> Option<Duration> {
        mean(self.records.iter().filter_map(IterationRecord::native_time))
    }

    /// Reference time divided by native time; above 1.0 means native is faster
    pub fn speedup(&self) -> Option<f64> {
        let reference = self.mean_reference()?.as_secs_f64();
        let native = self.mean_native()?.as_secs_f64();
        if native > 0.0 {
            Some(reference / native)
        } else {
            None
        }
    }

    /// Runs where the two implementations disagreed
    pub fn mismatches(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, IterationOutcome::Mismatch { .. }))
            .count()
    }

    /// Runs where the bridged call failed
    pub fn failures(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, IterationOutcome::BridgeFailed(_)))
            .count()
    }

    /// No disagreement was observed
    pub fn passed(&self) -> bool {
        self.mismatches() == 0
    }

    /// Write the averages and ratio
    pub fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Summary:")?;
        writeln!(
            out,
            "  Runs: {} ({} verified, {} mismatched, {} failed)",
            self.records.len(),
            self.records.len() - self.mismatches() - self.failures(),
            self.mismatches(),
            self.failures()
        )?;
        match self.mean_reference() {
            Some(t) => writeln!(out, "  Reference average: {:?}", t)?,
            None => writeln!(out, "  Reference average: n/a")?,
        }
        match self.mean_native() {
            Some(t) => writeln!(out, "  Native average: {:?}", t)?,
            None => writeln!(out, "  Native average: n/a")?,
        }
        match self.speedup() {
            Some(ratio) => writeln!(out, "  Native speedup: {:.2}x", ratio)?,
            None => writeln!(out, "  Native speedup: n/a")?,
        }
        Ok(())
    }
}

fn mean(durations: impl Iterator<Item = Duration>) -> Option<Duration> {
    let (total, n) = durations.fold((Duration::ZERO, 0u64), |(total, n), d| (total + d, n + 1));
    if n == 0 {
        None
    } else {
        Some(Duration::from_nanos((total.as_nanos() / u128::from(n)) as u64))
    }
}

/// Generate `len` values uniformly over `[min, max]`
///
/// Panics if `min > max`; [`run_experiment`] checks the range first.
pub fn generate_dataset<R: Rng>(rng: &mut R, len: usize, min: i32, max: i32) -> Vec<i32> {
    rng.sample_iter(Uniform::new_inclusive(min, max))
        .take(len)
        .collect()
}

/// Compare the bridged call against the reference on random data
///
/// Per-run lines and the summary are written to `out`. An unloaded bridge is
/// reported to `out` and returned as [`HarnessError::BridgeUnavailable`].
pub fn run_experiment<W: Write>(
    bridge: &Bridge,
    config: &ExperimentConfig,
    out: &mut W,
) -> Result<ExperimentReport, HarnessError> {
    if let Err(e) = bridge.ensure_loaded() {
        writeln!(out, "Error: {}", e)?;
        writeln!(out, "Experiment aborted, no native calls were made.")?;
        return Err(HarnessError::BridgeUnavailable(e));
    }

    if config.min_value > config.max_value {
        return Err(HarnessError::InvalidRange {
            min: config.min_value,
            max: config.max_value,
        });
    }

    writeln!(
        out,
        "Running {} runs over {} values in [{}, {}] via {}",
        config.num_runs,
        config.dataset_size,
        config.min_value,
        config.max_value,
        bridge.path().display()
    )?;

    let mut rng = config.rng();
    let mut report = ExperimentReport::default();

    for run in 1..=config.num_runs {
        let data = generate_dataset(&mut rng, config.dataset_size, config.min_value, config.max_value);

        let start = Instant::now();
        let reference_count = reference::count_positives(&data);
        let reference_time = start.elapsed();

        let start = Instant::now();
        let native = bridge.count(&data);
        let native_time = start.elapsed();

        let outcome = match native {
            Ok(native_count) if usize::try_from(native_count).ok() == Some(reference_count) => {
                IterationOutcome::Verified {
                    native_count,
                    native_time,
                }
            }
            Ok(native_count) => IterationOutcome::Mismatch {
                native_count,
                native_time,
            },
            Err(e) => IterationOutcome::BridgeFailed(e),
        };

        let record = IterationRecord {
            run,
            reference_count,
            reference_time,
            outcome,
        };
        write_record(out, &record)?;
        report.records.push(record);
    }

    report.write_summary(out)?;
    Ok(report)
}

fn write_record<W: Write>(out: &mut W, record: &IterationRecord) -> std::io::Result<()> {
    match &record.outcome {
        IterationOutcome::Verified {
            native_count,
            native_time,
        } => writeln!(
            out,
            "Run {}: native={} ({:?}) reference={} ({:?}) PASS",
            record.run, native_count, native_time, record.reference_count, record.reference_time
        ),
        IterationOutcome::Mismatch {
            native_count,
            native_time,
        } => writeln!(
            out,
            "Run {}: native={} ({:?}) reference={} ({:?}) FAIL: results differ",
            record.run, native_count, native_time, record.reference_count, record.reference_time
        ),
        IterationOutcome::BridgeFailed(e) => writeln!(
            out,
            "Run {}: native call failed: {} reference={} ({:?}) SKIPPED",
            record.run, e, record.reference_count, record.reference_time
        ),
    }
}

/// Both implementations' answers for one dynamically typed sequence
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCheck {
    pub native: Result<i32, BridgeError>,
    pub reference: Result<usize, BridgeError>,
}

impl ValueCheck {
    /// Same count, or the same element rejected for the same reason
    pub fn agreed(&self) -> bool {
        match (&self.native, &self.reference) {
            (Ok(native), Ok(reference)) => usize::try_from(*native).ok() == Some(*reference),
            (Err(native), Err(reference)) => native == reference,
            _ => false,
        }
    }
}

/// Count `values` through the bridge and the reference and compare
///
/// One result line is written to `out`. As with [`run_experiment`], an unloaded
/// bridge is reported and returned as [`HarnessError::BridgeUnavailable`].
pub fn check_values<W: Write>(
    bridge: &Bridge,
    values: &[FfiValue],
    out: &mut W,
) -> Result<ValueCheck, HarnessError> {
    if let Err(e) = bridge.ensure_loaded() {
        writeln!(out, "Error: {}", e)?;
        return Err(HarnessError::BridgeUnavailable(e));
    }

    let check = ValueCheck {
        native: bridge.invoke(values),
        reference: reference::count_positive_values(values),
    };
    writeln!(
        out,
        "Values ({} elements): native={} reference={} {}",
        values.len(),
        show(&check.native),
        show(&check.reference),
        if check.agreed() { "PASS" } else { "FAIL: results differ" }
    )?;
    Ok(check)
}

fn show<T: std::fmt::Display>(result: &Result<T, BridgeError>) -> String {
    match result {
        Ok(count) => count.to_string(),
        Err(e) => format!("rejected ({})", e),
    }
}
