//! Tests for [`MemoryStore`]: the in-process TTL store.

use std::time::Duration;

use memogate::{CacheStore, MemoryStore, MemoryStoreConfig};

// =========================================================================
// MemoryStoreConfig
// =========================================================================

#[test]
fn store_config_defaults() {
    let config = MemoryStoreConfig::default();
    assert_eq!(config.max_entries, 10_000);
}

#[test]
fn store_config_builder() {
    let config = MemoryStoreConfig::new().max_entries(500);
    assert_eq!(config.max_entries, 500);
}

// =========================================================================
// Basic operations
// =========================================================================

#[tokio::test]
async fn get_missing_key_is_none() {
    let store = MemoryStore::default();
    assert_eq!(store.name(), "memory");
    assert!(store.get("absent").await.unwrap().is_none());
}

#[tokio::test]
async fn set_then_get() {
    let store = MemoryStore::default();
    store
        .set("k", b"value".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(store.get("k").await.unwrap(), Some(b"value".to_vec()));
    assert!(store.contains("k"));
}

#[tokio::test]
async fn set_overwrites() {
    let store = MemoryStore::default();
    store
        .set("k", b"old".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();
    store
        .set("k", b"new".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(store.get("k").await.unwrap(), Some(b"new".to_vec()));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let store = MemoryStore::default();
    store
        .set("k", b"v".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    store.delete("k").await.unwrap();
    store.delete("k").await.unwrap();
    store.delete("never-set").await.unwrap();

    assert!(store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn clear_removes_everything() {
    let store = MemoryStore::default();
    for key in ["a", "b", "c"] {
        store
            .set(key, key.as_bytes().to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
    }

    store.clear();

    for key in ["a", "b", "c"] {
        assert!(store.get(key).await.unwrap().is_none());
    }
}

// =========================================================================
// Expiry
// =========================================================================

#[tokio::test]
async fn entries_expire_after_their_ttl() {
    let store = MemoryStore::default();
    store
        .set("short", b"1".to_vec(), Duration::from_millis(50))
        .await
        .unwrap();
    store
        .set("long", b"2".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(store.get("short").await.unwrap().is_none());
    assert_eq!(store.get("long").await.unwrap(), Some(b"2".to_vec()));
}

#[tokio::test]
async fn overwrite_resets_ttl() {
    let store = MemoryStore::default();
    store
        .set("k", b"1".to_vec(), Duration::from_millis(50))
        .await
        .unwrap();
    store
        .set("k", b"2".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.get("k").await.unwrap(), Some(b"2".to_vec()));
}

#[tokio::test]
async fn clones_share_entries() {
    let store = MemoryStore::default();
    let clone = store.clone();
    store
        .set("k", b"v".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(clone.get("k").await.unwrap(), Some(b"v".to_vec()));
}
