pub mod json_store;
pub mod memory;
pub mod result_store;
pub mod schema;
pub mod storage;

use anyhow::Result;

/// Flat string key-value substrate. Implementations only move bytes;
/// namespacing and typing live in [`storage::Storage`].
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub use json_store::JsonStore;
pub use memory::MemoryStore;
pub use result_store::ResultStore;
pub use storage::Storage;
