//! Cache store adapters.
//!
//! Memoized calls persist successful responses through a [`CacheStore`]:
//! an opaque-key byte store with per-entry TTL. The store is the only
//! shared mutable state between calls, so implementations must make
//! `get`/`set`/`delete` atomic per key; the call layer does no locking of
//! its own.
//!
//! [`MemoryStore`] is the in-process implementation. Backends for a shared
//! service (redis and the like) implement the same trait and are injected
//! through [`SessionBuilder::store()`](crate::SessionBuilder::store).
//!
//! Expiry is the store's job: an entry past its TTL must read as absent.

mod memory;

pub use memory::{MemoryStore, MemoryStoreConfig};

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Key-value store with TTL, addressed by fingerprint strings.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    /// Fetch the value stored at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` at `key`, replacing any previous value, expiring
    /// after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Remove the entry at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
