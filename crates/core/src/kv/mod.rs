//! Asynchronous key-value storage.
//!
//! The store is the only durable primitive the core relies on. Each operation is assumed to be
//! atomic per key and durable once its future resolves; anything spanning several calls (a
//! read followed by a write) must be coordinated by the caller, see
//! [`RecordStore`](crate::RecordStore).

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::StoreResult;
use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Removes every key in `keys`, stopping at the first failure.
    async fn multi_remove(&self, keys: &[&str]) -> StoreResult<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
