//! Cache façade: orchestrates the memory and disk tiers.
//!
//! The façade is the sole entry point. Every operation hashes the key,
//! consults the memory store first, and falls back to disk:
//!
//! - `set` places the entry at the newest end, then evicts oldest entries
//!   to disk until the capacity bound holds
//! - `get` serves memory hits without reordering; a disk hit is decoded and
//!   promoted back into memory as the newest entry, which may itself evict
//! - `flush_all` / `close` drain memory to disk; `Drop` retries that as a
//!   best effort only

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{Codec, DecodeError, EncodeError, JsonCodec};
use crate::config::{CacheConfig, ConfigError};
use crate::digest::Digest;
use crate::store::{DiskStats, DiskStore, MemoryStore, StorageError};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Operation counters for one cache instance.
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    /// Gets served directly from memory.
    pub hits: u64,
    /// Gets that found nothing in either tier.
    pub misses: u64,
    /// Gets served from disk and re-inserted into memory.
    pub promotions: u64,
    /// Entries spilled to disk by the capacity bound.
    pub evictions: u64,
}

/// Bounded associative cache with disk spill.
///
/// At most `capacity` entries are memory-resident; older entries live as
/// digest-addressed files under the storage root and are promoted back on
/// read. Values are returned by clone, since a promotion both returns the
/// value and re-inserts it.
///
/// All operations are synchronous and take `&mut self`; a multi-threaded
/// caller wraps the whole cache in a single `Mutex`. Two instances must not
/// share a storage root.
///
/// Call [`Cache::close`] (or [`Cache::flush_all`]) before discarding the
/// instance: `Drop` attempts a flush but can only log a failure, not report
/// it.
pub struct Cache<V, C = JsonCodec>
where
    C: Codec<V>,
{
    memory: MemoryStore<V>,
    disk: DiskStore,
    codec: C,
    capacity: usize,
    stats: CacheStats,
    flushed: bool,
}

impl<V> Cache<V, JsonCodec>
where
    JsonCodec: Codec<V>,
{
    /// Construct with the default JSON codec.
    ///
    /// Validates the configuration first; an invalid storage root or zero
    /// capacity fails construction outright.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_codec(config, JsonCodec)
    }
}

impl<V, C> Cache<V, C>
where
    C: Codec<V>,
{
    /// Construct with a caller-supplied codec.
    pub fn with_codec(config: CacheConfig, codec: C) -> Result<Self, CacheError> {
        config.validate()?;
        info!(
            storage_path = %config.storage_path.display(),
            capacity = config.capacity,
            "Cache constructed"
        );
        Ok(Self {
            memory: MemoryStore::new(),
            disk: DiskStore::new(config.storage_path),
            codec,
            capacity: config.capacity,
            stats: CacheStats::default(),
            flushed: false,
        })
    }

    /// Whether a key is resident in memory or present on disk.
    pub fn exists(&self, key: &str) -> bool {
        let digest = Digest::of(key);
        self.memory.contains(&digest) || self.disk.exists(&digest)
    }

    /// Look up a key.
    ///
    /// A memory hit is returned as-is and never renews FIFO position. A disk
    /// hit is decoded and promoted: re-inserted as the newest memory entry,
    /// which may evict the current oldest. The now-stale disk copy is left in
    /// place until the next eviction of the same digest overwrites it.
    /// Absence is `Ok(None)`, never an error.
    pub fn get(&mut self, key: &str) -> Result<Option<V>, CacheError>
    where
        V: Clone,
    {
        let digest = Digest::of(key);

        if let Some(value) = self.memory.get(&digest) {
            self.stats.hits += 1;
            return Ok(Some(value.clone()));
        }

        let Some(bytes) = self.disk.read(&digest)? else {
            self.stats.misses += 1;
            return Ok(None);
        };

        let value: V = self.codec.decode(&bytes)?;
        self.stats.promotions += 1;
        debug!(digest = %digest, "Promoted entry from disk");

        self.insert(digest, value.clone())?;
        Ok(Some(value))
    }

    /// Insert or overwrite a key.
    ///
    /// The entry becomes the newest regardless of prior position; oldest
    /// entries are then spilled to disk until at most `capacity` remain.
    pub fn set(&mut self, key: &str, value: V) -> Result<(), CacheError> {
        self.insert(Digest::of(key), value)
    }

    /// Remove a key from both tiers. Deleting an absent key succeeds.
    pub fn delete(&mut self, key: &str) -> Result<(), CacheError> {
        let digest = Digest::of(key);
        self.memory.remove(&digest);
        self.disk.delete(&digest)?;
        Ok(())
    }

    /// Spill every memory-resident entry to disk, oldest first, leaving
    /// memory empty. The only operation that guarantees full persistence.
    pub fn flush_all(&mut self) -> Result<(), CacheError> {
        let drained = self.memory.len();
        while let Some((digest, value)) = self.memory.pop_oldest() {
            let bytes = self.codec.encode(&value)?;
            self.disk.write(&digest, &bytes)?;
        }
        if drained > 0 {
            info!(entries = drained, "Flushed memory store to disk");
        }
        self.flushed = true;
        Ok(())
    }

    /// Flush and consume the cache. The deterministic persistence path;
    /// errors surface here instead of being swallowed by `Drop`.
    pub fn close(mut self) -> Result<(), CacheError> {
        self.flush_all()
    }

    /// Re-validate and apply a new configuration.
    ///
    /// Swaps the storage root and capacity, then evicts down to the new
    /// bound. On validation failure the cache is left unchanged.
    pub fn reconfigure(&mut self, config: CacheConfig) -> Result<(), CacheError> {
        config.validate()?;
        info!(
            storage_path = %config.storage_path.display(),
            capacity = config.capacity,
            "Cache reconfigured"
        );
        self.disk = DiskStore::new(config.storage_path);
        self.capacity = config.capacity;
        self.evict_to_capacity()
    }

    /// Number of memory-resident entries.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Operation counters since construction.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Disk tier I/O counters since construction.
    pub fn disk_stats(&self) -> &DiskStats {
        self.disk.stats()
    }

    fn insert(&mut self, digest: Digest, value: V) -> Result<(), CacheError> {
        self.memory.set(digest, value);
        self.flushed = false;
        self.evict_to_capacity()
    }

    /// Spill oldest entries until the capacity bound holds. Eviction always
    /// rewrites the freshest value, so a stale disk copy converges to the
    /// last known value.
    fn evict_to_capacity(&mut self) -> Result<(), CacheError> {
        while self.memory.len() > self.capacity {
            let Some((digest, value)) = self.memory.pop_oldest() else {
                break;
            };
            let bytes = self.codec.encode(&value)?;
            self.disk.write(&digest, &bytes)?;
            self.stats.evictions += 1;
            debug!(digest = %digest, "Evicted oldest entry to disk");
        }
        Ok(())
    }
}

impl<V, C> Drop for Cache<V, C>
where
    C: Codec<V>,
{
    /// Best-effort flush. Not the guaranteed persistence mechanism: an I/O
    /// failure here can only be logged. Call `close` or `flush_all` first.
    fn drop(&mut self) {
        if self.flushed || self.memory.is_empty() {
            return;
        }
        if let Err(e) = self.flush_all() {
            warn!(error = %e, "Best-effort flush on drop failed");
        }
    }
}
