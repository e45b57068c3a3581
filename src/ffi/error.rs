//! FFI Errors

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the unloaded → loaded transition
///
/// Every variant carries plain strings so the cause can be cloned into each
/// error returned by an unloaded bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FfiError {
    /// The shared artifact could not be opened
    #[error("failed to load library '{}': {reason}", .path.display())]
    LoadError { path: PathBuf, reason: String },

    /// No candidate filename exists in any search directory
    #[error("library '{name}' not found, attempted: {}", join_paths(.attempted))]
    NotFound { name: String, attempted: Vec<PathBuf> },

    /// The artifact opened but does not export the symbol
    #[error("symbol '{symbol}' not found in '{}': {reason}", .path.display())]
    SymbolNotFound {
        symbol: String,
        path: PathBuf,
        reason: String,
    },

    /// Symbol name cannot be passed to the platform loader
    #[error("invalid symbol name: {0:?}")]
    InvalidSymbol(String),

    /// Declared signature could not be parsed
    #[error("invalid signature: {0:?}")]
    InvalidSignature(String),

    /// Declared signature does not match the shape the bridge can call
    #[error("ABI mismatch for '{symbol}': bridge calls `{expected}`, library declares `{declared}`")]
    AbiMismatch {
        symbol: String,
        expected: String,
        declared: String,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no search paths".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned by a bridged invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The bridge never reached the loaded state
    #[error("native library not available (attempted '{}'): {cause}", .path.display())]
    Unavailable { path: PathBuf, cause: FfiError },

    /// An element of the input sequence is not a 32-bit integer
    #[error("type contract violation at index {index}: expected i32, got {found}")]
    TypeContract { index: usize, found: String },

    /// The input is longer than the 32-bit length parameter can express
    #[error("input of {0} elements exceeds the i32 length limit of the native call")]
    LengthOverflow(usize),
}

impl BridgeError {
    /// Whether this error comes from the library never having loaded
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BridgeError::Unavailable { .. })
    }
}
