use std::collections::HashMap;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{KeyType, KvStore};
use crate::errors::ServiceError;

/// Redis-backed store over one multiplexed connection.
///
/// The connection is opened once in [`RedisStore::connect`] and shared by every
/// caller; there is no pool and no reconnect. [`KvStore::close`] drops it.
pub struct RedisStore {
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, ServiceError> {
        let client = Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn: RwLock::new(Some(conn)) })
    }

    async fn conn(&self) -> Result<MultiplexedConnection, ServiceError> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| ServiceError::Store("store connection is closed".into()))
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn ping(&self) -> Result<(), ServiceError> {
        let mut c = self.conn().await?;
        let pong: String = redis::cmd("PING").query_async(&mut c).await?;
        debug!(%pong, "redis ping");
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, ServiceError> {
        let mut c = self.conn().await?;
        let n: i64 = c.incr(key, 1).await?;
        Ok(n)
    }

    async fn exists(&self, key: &str) -> Result<bool, ServiceError> {
        let mut c = self.conn().await?;
        let found: bool = c.exists(key).await?;
        Ok(found)
    }

    async fn key_type(&self, key: &str) -> Result<KeyType, ServiceError> {
        let mut c = self.conn().await?;
        let name: String = redis::cmd("TYPE").arg(key).query_async(&mut c).await?;
        Ok(KeyType::from_type_name(&name))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, ServiceError> {
        let mut c = self.conn().await?;
        let keys: Vec<String> = c.keys(pattern).await?;
        Ok(keys)
    }

    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> Result<(), ServiceError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut c = self.conn().await?;
        c.hset_multiple::<_, _, _, ()>(key, fields).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, ServiceError> {
        let mut c = self.conn().await?;
        let map: HashMap<String, String> = c.hgetall(key).await?;
        Ok(map)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, ServiceError> {
        let mut c = self.conn().await?;
        let value: Option<String> = c.hget(key, field).await?;
        Ok(value)
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        let mut c = self.conn().await?;
        c.rpush::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn lrange_all(&self, key: &str) -> Result<Vec<String>, ServiceError> {
        let mut c = self.conn().await?;
        let values: Vec<String> = c.lrange(key, 0, -1).await?;
        Ok(values)
    }

    async fn del(&self, keys: &[String]) -> Result<(), ServiceError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut c = self.conn().await?;
        c.del::<_, ()>(keys).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ServiceError> {
        if self.conn.write().await.take().is_some() {
            info!("redis connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Runs only against a live server: REDIS_URL=redis://127.0.0.1:6379/15
    async fn live_store() -> Option<RedisStore> {
        let url = std::env::var("REDIS_URL").ok()?;
        match RedisStore::connect(&url).await {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("skip: cannot connect to redis: {}", e);
                None
            }
        }
    }

    #[tokio::test]
    async fn redis_hash_list_counter_primitives() -> anyhow::Result<()> {
        let Some(store) = live_store().await else { return Ok(()) };
        let prefix = format!("test:{}", uuid::Uuid::new_v4());
        let hash = format!("{prefix}:h");
        let list = format!("{prefix}:l");
        let counter = format!("{prefix}:c");

        store.ping().await?;
        assert_eq!(store.incr(&counter).await?, 1);
        assert_eq!(store.incr(&counter).await?, 2);

        store.hset_multiple(&hash, &[("a", "1".into()), ("b", "2".into())]).await?;
        assert_eq!(store.hget(&hash, "b").await?.as_deref(), Some("2"));
        assert_eq!(store.hgetall(&hash).await?.len(), 2);
        assert_eq!(store.key_type(&hash).await?, KeyType::Hash);

        store.rpush(&list, "x").await?;
        store.rpush(&list, "y").await?;
        assert_eq!(store.lrange_all(&list).await?, vec!["x", "y"]);
        assert_eq!(store.key_type(&list).await?, KeyType::List);

        let mut found = store.keys(&format!("{prefix}:*")).await?;
        found.sort();
        assert_eq!(found, vec![counter.clone(), hash.clone(), list.clone()]);

        store.del(&[hash.clone(), list.clone(), counter]).await?;
        assert!(!store.exists(&hash).await?);
        assert_eq!(store.key_type(&list).await?, KeyType::None);

        store.close().await?;
        assert!(matches!(store.ping().await, Err(ServiceError::Store(_))));
        Ok(())
    }
}
