//! spillcache: bounded in-memory cache with transparent disk spill.
//!
//! A fixed number of values live in memory in FIFO-with-renewal order; once
//! the capacity is exceeded, the oldest values spill to digest-addressed
//! files under a sharded directory tree, and reading a spilled value
//! promotes it back into memory as the newest entry.
//!
//! ```no_run
//! use spillcache::{Cache, CacheConfig};
//!
//! # fn main() -> Result<(), spillcache::CacheError> {
//! let config = CacheConfig::new("/var/cache/myapp").with_capacity(1024);
//! let mut cache: Cache<String> = Cache::new(config)?;
//!
//! cache.set("greeting", "hello".to_string())?;
//! assert_eq!(cache.get("greeting")?, Some("hello".to_string()));
//!
//! // Explicit close guarantees persistence; Drop only makes a best effort.
//! cache.close()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod digest;
pub mod store;

pub use cache::{Cache, CacheError, CacheStats};
pub use codec::{Codec, DecodeError, EncodeError, JsonCodec};
pub use config::{CacheConfig, ConfigError, DEFAULT_CAPACITY};
pub use digest::Digest;
pub use store::{DiskStats, DiskStore, MemoryStore, StorageError};
