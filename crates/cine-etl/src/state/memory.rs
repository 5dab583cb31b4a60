//! In-memory state storage
//!
//! Backs unit tests and local experiments; state dies with the process.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StateStorage;
use crate::error::Result;

/// Process-local state storage
#[derive(Default)]
pub struct MemoryStorage {
    scalars: RwLock<HashMap<String, String>>,
    sets: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.scalars.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.scalars
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn add_members(&self, key: &str, members: &[String]) -> Result<()> {
        let mut sets = self.sets.write().await;
        let set = sets.entry(key.to_string()).or_default();
        set.extend(members.iter().cloned());
        Ok(())
    }

    async fn members(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .sets
            .read()
            .await
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.scalars.write().await.remove(key);
        self.sets.write().await.remove(key);
        Ok(())
    }
}
