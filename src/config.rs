//! Cache configuration and validation.
//!
//! Configuration can be loaded from a JSON file or constructed
//! programmatically. Validation happens once, up front: a cache is never
//! partially constructed over a bad storage root or a zero capacity.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default memory capacity in entries.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("storage path {0:?} does not exist or is not a directory")]
    StoragePath(PathBuf),

    #[error("storage path {path:?} is not writable: {source}")]
    NotWritable { path: PathBuf, source: io::Error },

    #[error("capacity must be at least 1")]
    ZeroCapacity,

    #[error("failed to read config file {path:?}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },

    #[error("invalid config file {path:?}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Cache instance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory for spilled entries. Must exist and be writable.
    pub storage_path: PathBuf,

    /// Maximum number of memory-resident entries.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl CacheConfig {
    /// Configuration with the default capacity.
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Override the memory capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Load configuration from a JSON file.
    ///
    /// An absent or malformed file is an error here, not a fallback to
    /// defaults: a defaulted storage root would silently spill entries to
    /// the wrong directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration.
    ///
    /// The storage path must be an existing, writable directory (writability
    /// is verified with a probe file, so a read-only root fails here instead
    /// of at the first eviction), and capacity must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if !self.storage_path.is_dir() {
            return Err(ConfigError::StoragePath(self.storage_path.clone()));
        }

        let probe = self.storage_path.join(".write-probe");
        match fs::write(&probe, b"") {
            Ok(()) => {
                let _ = fs::remove_file(&probe);
                Ok(())
            }
            Err(source) => Err(ConfigError::NotWritable {
                path: self.storage_path.clone(),
                source,
            }),
        }
    }
}
