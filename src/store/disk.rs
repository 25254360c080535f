//! Disk store: digest-addressed files under a two-level sharded tree.
//!
//! A spilled entry lives at `<root>/<digest[0:2]>/<digest[2:4]>/<digest>`,
//! containing exactly the encoded bytes of one value. Shard directories are
//! created lazily on the first write into that shard; files are overwritten
//! on re-flush and removed on delete.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::digest::Digest;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to create shard directory {path:?}: {source}")]
    CreateShard { path: PathBuf, source: io::Error },

    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to delete {path:?}: {source}")]
    Delete { path: PathBuf, source: io::Error },
}

/// I/O statistics for the disk tier.
#[derive(Debug, Default, Clone)]
pub struct DiskStats {
    pub total_writes: u64,
    pub total_reads: u64,
    pub total_bytes_written: u64,
    pub total_bytes_read: u64,
}

/// Persists encoded values under a pre-validated storage root.
#[derive(Debug)]
pub struct DiskStore {
    root: PathBuf,
    stats: DiskStats,
}

impl DiskStore {
    /// The root must already be validated (existing, writable directory);
    /// [`crate::config::CacheConfig::validate`] does that.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            stats: DiskStats::default(),
        }
    }

    /// File path for a digest inside its shard.
    fn file_path(&self, digest: &Digest) -> PathBuf {
        let (seg1, seg2) = digest.shard();
        self.root.join(seg1).join(seg2).join(digest.as_str())
    }

    /// Whether a file for this digest exists under its shard path.
    pub fn exists(&self, digest: &Digest) -> bool {
        self.file_path(digest).is_file()
    }

    /// Write the bytes for a digest, overwriting any prior content.
    pub fn write(&mut self, digest: &Digest, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.file_path(digest);

        if let Some(shard) = path.parent() {
            fs::create_dir_all(shard).map_err(|source| StorageError::CreateShard {
                path: shard.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, bytes).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(
            digest = %digest,
            path = %path.display(),
            size = bytes.len(),
            "Wrote entry to disk"
        );

        self.stats.total_writes += 1;
        self.stats.total_bytes_written += bytes.len() as u64;

        Ok(())
    }

    /// Read the bytes for a digest. `Ok(None)` when no file exists; absence
    /// is reported through the return value, not as an error.
    pub fn read(&mut self, digest: &Digest) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.file_path(digest);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Read { path, source }),
        };

        debug!(
            digest = %digest,
            path = %path.display(),
            size = bytes.len(),
            "Read entry from disk"
        );

        self.stats.total_reads += 1;
        self.stats.total_bytes_read += bytes.len() as u64;

        Ok(Some(bytes))
    }

    /// Delete the file for a digest. A missing file is a silent no-op.
    pub fn delete(&mut self, digest: &Digest) -> Result<(), StorageError> {
        let path = self.file_path(digest);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(digest = %digest, path = %path.display(), "Deleted entry file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Delete { path, source }),
        }
    }

    /// I/O counters since construction.
    pub fn stats(&self) -> &DiskStats {
        &self.stats
    }
}
