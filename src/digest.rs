//! Key hashing and shard addressing.
//!
//! Every cache key is reduced to a fixed-length SHA-256 digest, held in
//! lowercase hex. The digest is the sole storage identifier in both the
//! memory and disk layers, and its leading characters decide which shard
//! directory a spilled value lands in.

use std::fmt;

use sha2::{Digest as _, Sha256};

/// Fixed-length identifier derived deterministically from a cache key.
///
/// 64 lowercase hex characters (SHA-256). Collisions are treated as
/// negligible; the digest is used directly as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Hash a key. Same key always yields the same digest.
    pub fn of(key: &str) -> Self {
        let hash = Sha256::digest(key.as_bytes());
        Digest(hex::encode(hash))
    }

    /// The hex form, used as the on-disk file name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two nested shard directory names: first two and next two hex
    /// characters. 256 × 256 fan-out bounds per-directory file counts.
    pub fn shard(&self) -> (&str, &str) {
        (&self.0[0..2], &self.0[2..4])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
