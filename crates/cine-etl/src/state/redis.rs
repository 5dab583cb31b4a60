//! Redis-backed state storage

use async_trait::async_trait;
use redis::AsyncCommands;

use super::StateStorage;
use crate::error::Result;

/// State storage over a Redis instance
///
/// Watermarks are plain string keys, in-flight ids are Redis sets. The
/// client hands out multiplexed connections, so one `RedisStorage` can be
/// shared by concurrent pipeline tasks.
pub struct RedisStorage {
    client: redis::Client,
}

impl RedisStorage {
    /// Create a new storage connected to the given URL
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl StateStorage for RedisStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn add_members(&self, key: &str, members: &[String]) -> Result<()> {
        // SADD with an empty member list is a protocol error
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        conn.sadd::<_, _, ()>(key, members).await?;
        Ok(())
    }

    async fn members(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.smembers(key).await?)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
