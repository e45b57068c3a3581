//! Logic Bridge Configuration
//!
//! Handles parsing and management of logic_bridge.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ffi::{loader, FfiError, DEFAULT_LIBRARY, DEFAULT_SIGNATURE};
use crate::harness::ExperimentConfig;

/// File name searched for by [`BridgeConfig::load_from_cwd`].
pub const CONFIG_FILE: &str = "logic_bridge.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching logic_bridge.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Native artifact location and contract
    #[serde(default)]
    pub library: LibraryConfig,

    /// Benchmark parameters
    #[serde(default)]
    pub experiment: ExperimentConfig,

    /// Reporting
    #[serde(default)]
    pub output: OutputConfig,
}

impl BridgeConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }
}

/// Native artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Artifact base name (`logic` → `liblogic.so`)
    #[serde(default = "default_library_name")]
    pub name: String,

    /// Explicit artifact path, bypassing the search
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Directories searched before the executable's own
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Declared C signature of the export, including its symbol name
    #[serde(default = "default_signature")]
    pub signature: String,
}

fn default_library_name() -> String {
    DEFAULT_LIBRARY.to_string()
}

fn default_signature() -> String {
    DEFAULT_SIGNATURE.to_string()
}

impl LibraryConfig {
    /// Path to open: the explicit one, else the result of searching.
    ///
    /// Configured search paths are tried before the defaults.
    pub fn resolve_path(&self) -> Result<PathBuf, FfiError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let mut search_paths = self.search_paths.clone();
        search_paths.extend(loader::default_search_paths());
        loader::locate(&self.name, &search_paths)
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: default_library_name(),
            path: None,
            search_paths: Vec::new(),
            signature: default_signature(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Print diagnostics (resolved paths, load causes) to stderr
    #[serde(default)]
    pub verbose: bool,
}
