//! Logic Bridge - Verified Native Calls Across the C ABI
//!
//! Loads the `logic` shared library at runtime, calls its `count_positives`
//! export through a typed wrapper, and checks every answer against a host-side
//! reference implementation while timing both.
//!
//! # Features
//!
//! - **Explicit bridge context**: the loaded library is an owned [`ffi::Bridge`]
//!   value, not hidden global state
//! - **Lazy failure**: a missing artifact or symbol is recorded at open time and
//!   reported on first use
//! - **Contract checks before the boundary**: non-integer input and oversized
//!   buffers are rejected host-side
//! - **Verification harness**: random datasets, per-run comparison, timing summary
//!
//! # Example
//!
//! ```no_run
//! use logic_bridge::ffi::Bridge;
//! use logic_bridge::harness::{run_experiment, ExperimentConfig};
//!
//! let bridge = Bridge::open_default();
//! let config = ExperimentConfig::new(10_000, 3);
//! match run_experiment(&bridge, &config, &mut std::io::stdout()) {
//!     Ok(report) => assert!(report.passed()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    Harness      │  random data, timing, comparison
//! └────────┬────────┘
//!     ┌────┴─────┐
//!     ▼          ▼
//! ┌────────┐  ┌───────────┐
//! │ Bridge │  │ Reference │
//! └───┬────┘  └───────────┘
//!     │ libloading
//!     ▼
//! ┌─────────────────────┐
//! │  liblogic (cdylib)  │  count_positives(const int32_t *, int32_t)
//! └─────────────────────┘
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod ffi;
pub mod harness;
pub mod reference;

// Re-export commonly used types
pub use config::{BridgeConfig, ConfigError, LibraryConfig};
pub use ffi::{Bridge, BridgeError, FfiError, FfiSignature, FfiType, FfiValue, LazyBridge};
pub use harness::{run_experiment, ExperimentConfig, ExperimentReport, HarnessError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
