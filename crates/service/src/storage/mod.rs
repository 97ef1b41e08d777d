//! Key-value store abstraction used by the repositories.
//!
//! Only the handful of hash/list/counter primitives the record mapping needs
//! are exposed. `RedisStore` talks to a real server; `MemoryStore` mirrors the
//! same semantics in-process for tests and the `memory` backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use configs::{StoreBackend, StoreConfig};
use tracing::info;

use crate::errors::ServiceError;

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

/// Store-level type of a key, as reported by `TYPE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyType {
    None,
    String,
    List,
    Hash,
    Other(String),
}

impl KeyType {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "none" => KeyType::None,
            "string" => KeyType::String,
            "list" => KeyType::List,
            "hash" => KeyType::Hash,
            other => KeyType::Other(other.to_string()),
        }
    }
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn ping(&self) -> Result<(), ServiceError>;
    /// Atomically add one to the integer at `key` (missing counts as 0).
    async fn incr(&self, key: &str) -> Result<i64, ServiceError>;
    async fn exists(&self, key: &str) -> Result<bool, ServiceError>;
    async fn key_type(&self, key: &str) -> Result<KeyType, ServiceError>;
    /// Glob-style key scan (`*` and `?`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, ServiceError>;
    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> Result<(), ServiceError>;
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, ServiceError>;
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, ServiceError>;
    async fn rpush(&self, key: &str, value: &str) -> Result<(), ServiceError>;
    async fn lrange_all(&self, key: &str) -> Result<Vec<String>, ServiceError>;
    async fn del(&self, keys: &[String]) -> Result<(), ServiceError>;
    /// Release the underlying connection. Later calls fail with `Store`.
    async fn close(&self) -> Result<(), ServiceError> { Ok(()) }
}

/// Open the backend selected in configuration.
pub async fn open(cfg: &StoreConfig) -> Result<Arc<dyn KvStore>, ServiceError> {
    match cfg.backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&cfg.url()).await?;
            info!(host = %cfg.host, port = cfg.port, db = cfg.db, "redis store connected");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
