//! Dynamic Library Loader
//!
//! Safe wrapper around libloading for opening the native artifact and resolving
//! its exports, plus the platform conventions used to find it on disk.

use std::ffi::CString;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use super::FfiError;

/// Environment variable holding extra directories to search for the artifact
pub const LIB_DIR_ENV: &str = "LOGIC_BRIDGE_LIB_DIR";

/// Raw C signature of a buffer reduction: `int32_t f(const int32_t *, int32_t)`
pub type BufferReductionFn = unsafe extern "C" fn(*const i32, i32) -> i32;

/// A dynamically loaded library
pub struct DynamicLibrary {
    /// Path to the library
    path: PathBuf,
    /// The loaded library handle
    library: Library,
}

impl DynamicLibrary {
    /// Load a library from the given path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FfiError> {
        let path = path.as_ref().to_path_buf();

        // Safety: opening a library runs its initializers. The path comes from
        // the caller's configuration and is trusted like any other local code.
        let library = unsafe {
            Library::new(&path).map_err(|e| FfiError::LoadError {
                path: path.clone(),
                reason: e.to_string(),
            })?
        };

        Ok(Self { path, library })
    }

    /// Resolve an export with the buffer-reduction signature
    ///
    /// The returned function pointer is only valid while `self` is alive.
    pub fn buffer_reduction(&self, name: &str) -> Result<BufferReductionFn, FfiError> {
        let c_name =
            CString::new(name).map_err(|_| FfiError::InvalidSymbol(name.to_string()))?;

        // Safety: the symbol type is asserted by the caller's declared signature,
        // which the bridge checks against `BufferReductionFn` before calling this.
        let symbol: Symbol<BufferReductionFn> = unsafe {
            self.library
                .get(c_name.as_bytes_with_nul())
                .map_err(|e| FfiError::SymbolNotFound {
                    symbol: name.to_string(),
                    path: self.path.clone(),
                    reason: e.to_string(),
                })?
        };

        Ok(*symbol)
    }
}

impl std::fmt::Debug for DynamicLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicLibrary")
            .field("path", &self.path)
            .finish()
    }
}

/// Find `name`'s artifact in `search_paths`
///
/// A name with a directory component, or one naming an existing library file,
/// is used as is. Anything else is treated as a base name and every platform
/// filename for it is tried in every search path, in order. The first candidate
/// that exists wins; when none does the error lists all of them.
pub fn locate(name: &str, search_paths: &[PathBuf]) -> Result<PathBuf, FfiError> {
    let direct = Path::new(name);
    if direct.components().count() > 1 || is_library_file(direct) {
        return Ok(direct.to_path_buf());
    }

    let attempted: Vec<PathBuf> = search_paths
        .iter()
        .flat_map(|dir| library_filenames(name).into_iter().map(move |f| dir.join(f)))
        .collect();

    match attempted.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(FfiError::NotFound {
            name: name.to_string(),
            attempted,
        }),
    }
}

/// Whether `path` is an existing file with a dynamic library extension
fn is_library_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "so" | "dylib" | "dll"))
}

/// Default search paths for the artifact
///
/// The artifact is a sibling of the running executable. Test and bench binaries
/// live one level deeper in Cargo's `deps/`, so its parent is searched as well.
/// Directories from [`LIB_DIR_ENV`] come last.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let in_deps = dir.file_name().is_some_and(|n| n == "deps");
        let parent = dir.parent().map(Path::to_path_buf);
        paths.push(dir);
        if in_deps {
            paths.extend(parent);
        }
    }

    if let Some(extra) = std::env::var_os(LIB_DIR_ENV) {
        paths.extend(std::env::split_paths(&extra));
    }

    paths
}

/// Construct the platform-specific library filename
pub fn library_filename(name: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        format!("lib{}.dylib", name)
    }

    #[cfg(target_os = "windows")]
    {
        format!("lib{}.dll", name)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        format!("lib{}.so", name)
    }
}

/// Every filename the artifact may have on this platform, preferred first
///
/// Rust cdylibs on Windows drop the `lib` prefix, so `name.dll` is tried after
/// the conventional `libname.dll`.
fn library_filenames(name: &str) -> Vec<String> {
    let mut names = vec![library_filename(name)];
    if cfg!(target_os = "windows") {
        names.push(format!("{}.dll", name));
    }
    names
}
