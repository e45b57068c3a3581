//! FFI Module for Logic Bridge
//!
//! Safe foreign function interface for calling the native `count_positives`
//! export from host code.
//!
//! # Architecture
//!
//! ```text
//! Host code (&[i32] or &[FfiValue])
//!       │
//!       ▼
//! Bridge (load state, type contract, length check)
//!       │
//!       ▼
//! Dynamic Loader (libloading)
//!       │
//!       ▼
//! count_positives(const int32_t *, int32_t) -> int32_t
//! ```
//!
//! # Example
//!
//! ```no_run
//! use logic_bridge::ffi::{Bridge, FfiValue};
//!
//! let bridge = Bridge::open_default();
//! match bridge.count(&[-1, 0, 1]) {
//!     Ok(count) => assert_eq!(count, 1),
//!     Err(e) => eprintln!("{}", e),
//! }
//!
//! let mixed = vec![FfiValue::from(1), FfiValue::from("two")];
//! assert!(bridge.invoke(&mixed).is_err());
//! ```

mod bridge;
mod error;
pub mod loader;
mod types;

pub use bridge::{Bridge, LazyBridge, DEFAULT_LIBRARY, DEFAULT_SIGNATURE, DEFAULT_SYMBOL};
pub use error::{BridgeError, FfiError};
pub use loader::{BufferReductionFn, DynamicLibrary};
pub use types::{FfiSignature, FfiType, FfiValue};
