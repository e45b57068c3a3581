//! Native Bridge
//!
//! The context object that owns the loaded artifact and exposes the typed
//! `count_positives` wrapper to host code.
//!
//! # States
//!
//! ```text
//!   open() ──┬── ok ──────▶ Loaded   (library + resolved symbol)
//!            └── failure ─▶ Unloaded (path + cause remembered)
//! ```
//!
//! There is no transition back. Opening never fails outright: an unloaded bridge
//! is a valid value, and the recorded cause is returned by every call made
//! through it. Callers that would rather fail at startup check
//! [`Bridge::ensure_loaded`] right after opening.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use super::loader::{self, BufferReductionFn, DynamicLibrary};
use super::{BridgeError, FfiError, FfiSignature, FfiValue};
use crate::config::LibraryConfig;

/// Symbol exported by the native artifact
pub const DEFAULT_SYMBOL: &str = "count_positives";

/// Base name of the native artifact (`liblogic.so` and friends)
pub const DEFAULT_LIBRARY: &str = "logic";

/// Declared contract of the default export
pub const DEFAULT_SIGNATURE: &str = "i32 count_positives(ptr, i32)";

enum State {
    Loaded {
        func: BufferReductionFn,
        // Keeps the code behind `func` mapped. `None` for in-process functions.
        _library: Option<DynamicLibrary>,
    },
    Unloaded {
        cause: FfiError,
    },
}

/// Handle to the native `count_positives` export
pub struct Bridge {
    path: PathBuf,
    signature: FfiSignature,
    state: State,
}

impl Bridge {
    /// Open the artifact at `path` and resolve the export declared by `signature`
    ///
    /// The declaration must have the `i32 name(ptr, i32)` shape; anything else is
    /// recorded as an ABI mismatch without opening the file.
    pub fn open(path: impl AsRef<Path>, signature: &str) -> Self {
        let path = path.as_ref().to_path_buf();

        let declared = match FfiSignature::parse(signature) {
            Some(sig) => sig,
            None => {
                return Self::unavailable(path, FfiError::InvalidSignature(signature.to_string()))
            }
        };

        let expected = FfiSignature::buffer_reduction(declared.name.clone());
        if !declared.same_shape(&expected) {
            let cause = FfiError::AbiMismatch {
                symbol: declared.name.clone(),
                expected: expected.to_string(),
                declared: declared.to_string(),
            };
            return Self {
                path,
                signature: declared,
                state: State::Unloaded { cause },
            };
        }

        let state = match Self::resolve(&path, &declared.name) {
            Ok((library, func)) => State::Loaded {
                func,
                _library: Some(library),
            },
            Err(cause) => State::Unloaded { cause },
        };

        Self {
            path,
            signature: declared,
            state,
        }
    }

    /// Locate and open the artifact described by `config`
    ///
    /// When no candidate exists the bridge is unloaded with a cause naming every
    /// path that was tried.
    pub fn from_config(config: &LibraryConfig) -> Self {
        match config.resolve_path() {
            Ok(path) => Self::open(path, &config.signature),
            Err(cause) => Self::unavailable(loader::library_filename(&config.name), cause),
        }
    }

    /// Open the default artifact from the default search paths
    pub fn open_default() -> Self {
        Self::from_config(&LibraryConfig::default())
    }

    /// A loaded bridge over an in-process function with the export's signature
    ///
    /// `label` stands in for the artifact path in diagnostics.
    pub fn from_function(label: impl Into<PathBuf>, func: BufferReductionFn) -> Self {
        Self {
            path: label.into(),
            signature: FfiSignature::buffer_reduction(DEFAULT_SYMBOL),
            state: State::Loaded {
                func,
                _library: None,
            },
        }
    }

    /// An unloaded bridge that reports `cause` for every call
    pub fn unavailable(path: impl Into<PathBuf>, cause: FfiError) -> Self {
        Self {
            path: path.into(),
            signature: FfiSignature::buffer_reduction(DEFAULT_SYMBOL),
            state: State::Unloaded { cause },
        }
    }

    fn resolve(path: &Path, symbol: &str) -> Result<(DynamicLibrary, BufferReductionFn), FfiError> {
        let library = DynamicLibrary::load(path)?;
        let func = library.buffer_reduction(symbol)?;
        Ok((library, func))
    }

    /// Path that was opened (or attempted)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared contract of the resolved export
    pub fn signature(&self) -> &FfiSignature {
        &self.signature
    }

    /// Whether the bridge reached the loaded state
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded { .. })
    }

    /// Cause of the failed transition, if any
    pub fn load_error(&self) -> Option<&FfiError> {
        match &self.state {
            State::Loaded { .. } => None,
            State::Unloaded { cause } => Some(cause),
        }
    }

    /// Fail with [`BridgeError::Unavailable`] unless loaded
    pub fn ensure_loaded(&self) -> Result<(), BridgeError> {
        self.function().map(|_| ())
    }

    fn function(&self) -> Result<BufferReductionFn, BridgeError> {
        match &self.state {
            State::Loaded { func, .. } => Ok(*func),
            State::Unloaded { cause } => Err(BridgeError::Unavailable {
                path: self.path.clone(),
                cause: cause.clone(),
            }),
        }
    }

    /// Count positive elements of a dynamically typed sequence
    ///
    /// Every element must be an integer within the `i32` range. The whole
    /// sequence is checked before the native function is called, so a violation
    /// never reaches the boundary.
    pub fn invoke(&self, values: &[FfiValue]) -> Result<i32, BridgeError> {
        let func = self.function()?;
        let buffer = values
            .iter()
            .enumerate()
            .map(|(index, value)| value.checked_i32(index))
            .collect::<Result<Vec<i32>, _>>()?;
        call(func, &buffer)
    }

    /// Count positive elements of a typed buffer
    pub fn count(&self, values: &[i32]) -> Result<i32, BridgeError> {
        let func = self.function()?;
        call(func, values)
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("path", &self.path)
            .field("signature", &self.signature.to_string())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Hand `values` to the native function
///
/// Lengths beyond `i32::MAX` are rejected rather than truncated.
fn call(func: BufferReductionFn, values: &[i32]) -> Result<i32, BridgeError> {
    let len = i32::try_from(values.len()).map_err(|_| BridgeError::LengthOverflow(values.len()))?;

    // Safety: `values` is a live, contiguous slice of exactly `len` i32s, borrowed
    // for the whole call. The export only reads it and keeps no reference.
    Ok(unsafe { func(values.as_ptr(), len) })
}

/// A bridge opened on first use
///
/// The transition is attempted exactly once, even when several threads race
/// on the first call; every later call sees the same outcome.
pub struct LazyBridge {
    config: LibraryConfig,
    cell: OnceCell<Bridge>,
}

impl LazyBridge {
    /// Create an unopened bridge for `config`
    pub fn new(config: LibraryConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Open on first call, then return the same bridge
    pub fn get(&self) -> &Bridge {
        self.cell.get_or_init(|| Bridge::from_config(&self.config))
    }

    /// Whether the transition has been attempted yet
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// See [`Bridge::invoke`]
    pub fn invoke(&self, values: &[FfiValue]) -> Result<i32, BridgeError> {
        self.get().invoke(values)
    }

    /// See [`Bridge::count`]
    pub fn count(&self, values: &[i32]) -> Result<i32, BridgeError> {
        self.get().count(values)
    }
}

impl Default for LazyBridge {
    fn default() -> Self {
        Self::new(LibraryConfig::default())
    }
}

