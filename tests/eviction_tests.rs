//! Integration tests for the eviction and promotion policy.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use spillcache::{Cache, CacheConfig, Digest};

fn disk_file(root: &Path, key: &str) -> PathBuf {
    let digest = Digest::of(key);
    let (seg1, seg2) = digest.shard();
    root.join(seg1).join(seg2).join(digest.as_str())
}

fn cache_with_capacity(root: &Path, capacity: usize) -> Cache<String> {
    Cache::new(CacheConfig::new(root).with_capacity(capacity)).unwrap()
}

#[test]
fn test_capacity_bound_holds_after_every_set() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 4);

    for i in 0..50 {
        cache.set(&format!("k{i}"), format!("v{i}")).unwrap();
        assert!(cache.len() <= 4);
    }
    assert_eq!(cache.len(), 4);
    assert_eq!(cache.stats().evictions, 46);
}

#[test]
fn test_eviction_spills_oldest_to_sharded_file() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 2);

    cache.set("a", "va".to_string()).unwrap();
    cache.set("b", "vb".to_string()).unwrap();
    cache.set("c", "vc".to_string()).unwrap(); // evicts "a"

    let file = disk_file(tmp.path(), "a");
    assert!(file.is_file());
    // file holds exactly the encoded value, no header
    assert_eq!(fs::read(&file).unwrap(), b"\"va\"");

    assert!(!disk_file(tmp.path(), "b").exists());
    assert!(!disk_file(tmp.path(), "c").exists());
}

#[test]
fn test_plain_get_does_not_renew_position() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 2);

    cache.set("a", "va".to_string()).unwrap();
    cache.set("b", "vb".to_string()).unwrap();

    // a memory read must not save "a" from being the next eviction victim
    assert_eq!(cache.get("a").unwrap(), Some("va".to_string()));
    cache.set("c", "vc".to_string()).unwrap();

    assert!(disk_file(tmp.path(), "a").is_file());
    assert!(!disk_file(tmp.path(), "b").exists());
}

#[test]
fn test_re_set_renews_position() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 2);

    cache.set("a", "va".to_string()).unwrap();
    cache.set("b", "vb".to_string()).unwrap();
    cache.set("a", "va2".to_string()).unwrap(); // "a" renewed, "b" now oldest
    cache.set("c", "vc".to_string()).unwrap();

    assert!(disk_file(tmp.path(), "b").is_file());
    assert!(!disk_file(tmp.path(), "a").exists());
    assert_eq!(cache.get("a").unwrap(), Some("va2".to_string()));
}

#[test]
fn test_promotion_returns_value_and_renews() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 2);

    cache.set("a", "va".to_string()).unwrap();
    cache.set("b", "vb".to_string()).unwrap();
    cache.set("c", "vc".to_string()).unwrap(); // "a" → disk; memory: b, c

    // promotion reads the spilled value back and makes it newest, which
    // pushes the current oldest ("b") out
    assert_eq!(cache.get("a").unwrap(), Some("va".to_string()));
    assert_eq!(cache.stats().promotions, 1);
    assert_eq!(cache.len(), 2); // memory: c, a
    assert!(disk_file(tmp.path(), "b").is_file());

    // a second read is now a plain memory hit
    let reads_before = cache.disk_stats().total_reads;
    assert_eq!(cache.get("a").unwrap(), Some("va".to_string()));
    assert_eq!(cache.disk_stats().total_reads, reads_before);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_stale_disk_copy_survives_promotion() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 1);

    cache.set("a", "old".to_string()).unwrap();
    cache.set("b", "vb".to_string()).unwrap(); // "a" → disk
    cache.get("a").unwrap(); // promoted; "b" → disk

    // the disk copy of "a" is not deleted on promotion; it lingers until
    // the next eviction of the same digest overwrites it
    assert!(disk_file(tmp.path(), "a").is_file());
    assert_eq!(fs::read(disk_file(tmp.path(), "a")).unwrap(), b"\"old\"");
}

#[test]
fn test_eviction_rewrites_freshest_value_over_stale_copy() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 1);

    cache.set("a", "v1".to_string()).unwrap();
    cache.set("b", "vb".to_string()).unwrap(); // disk: a=v1
    cache.set("a", "v2".to_string()).unwrap(); // "b" → disk; memory: a=v2
    cache.set("c", "vc".to_string()).unwrap(); // "a" → disk again

    // disk state converged to the last known value
    assert_eq!(fs::read(disk_file(tmp.path(), "a")).unwrap(), b"\"v2\"");

    cache.close().unwrap();
    let mut reopened: Cache<String> =
        Cache::new(CacheConfig::new(tmp.path()).with_capacity(1)).unwrap();
    assert_eq!(reopened.get("a").unwrap(), Some("v2".to_string()));
}

#[test]
fn test_capacity_one_churn() {
    let tmp = TempDir::new().unwrap();
    let mut cache = cache_with_capacity(tmp.path(), 1);

    for i in 0..10 {
        cache.set(&format!("k{i}"), format!("v{i}")).unwrap();
        assert_eq!(cache.len(), 1);
    }
    for i in 0..10 {
        assert_eq!(
            cache.get(&format!("k{i}")).unwrap(),
            Some(format!("v{i}")),
            "k{i} must survive the churn"
        );
    }
}
