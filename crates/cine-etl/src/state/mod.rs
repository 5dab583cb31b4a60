//! Durable sync progress
//!
//! The pipelines record two facts per entity kind between runs: the
//! watermark (`<kind>:last_run_at`, a unix-seconds string) below which all
//! changes are assumed indexed, and the set of document ids written by the
//! current run (`<kind>:last_ids`). Both live in a key/value backend behind
//! the [`StateStorage`] trait; production uses Redis, tests use the
//! in-memory backend.
//!
//! Keys are partitioned per entity kind, so concurrent pipelines never race
//! on the same key.

mod memory;
mod redis;

pub use memory::MemoryStorage;
pub use redis::RedisStorage;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EtlError, Result};

/// Key/value contract required from a state backend
///
/// Scalars hold the watermark; sets hold the in-flight document ids. Reads
/// of an absent key return `None` / an empty set; absence means "never
/// synced", not an error. Backend unavailability is an error and must fail
/// the calling pipeline step loudly.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Retrieve a scalar value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a scalar value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Add members to a set value
    async fn add_members(&self, key: &str, members: &[String]) -> Result<()>;

    /// Retrieve all members of a set value
    async fn members(&self, key: &str) -> Result<Vec<String>>;

    /// Delete a key of either shape
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Typed facade over the raw storage, scoped to the sync protocol
#[derive(Clone)]
pub struct SyncState {
    storage: Arc<dyn StateStorage>,
}

impl SyncState {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self { storage }
    }

    /// Key holding the watermark for an entity kind
    pub fn watermark_key(kind: &str) -> String {
        format!("{kind}:last_run_at")
    }

    /// Key holding the in-flight document ids for an entity kind
    pub fn loaded_ids_key(kind: &str) -> String {
        format!("{kind}:last_ids")
    }

    /// Read the watermark for `kind`
    ///
    /// An absent watermark means the kind has never been synced and every
    /// row qualifies, so it decodes to the Unix epoch. A present but
    /// unparsable value is corrupt state and an error.
    pub async fn watermark(&self, kind: &str) -> Result<DateTime<Utc>> {
        let key = Self::watermark_key(kind);
        match self.storage.get(&key).await? {
            None => Ok(DateTime::UNIX_EPOCH),
            Some(raw) => {
                let secs: i64 = raw.trim().parse().map_err(|_| EtlError::CorruptState {
                    key: key.clone(),
                    reason: format!("not a unix timestamp: {raw:?}"),
                })?;
                DateTime::from_timestamp(secs, 0).ok_or_else(|| EtlError::CorruptState {
                    key,
                    reason: format!("timestamp out of range: {secs}"),
                })
            }
        }
    }

    /// Advance the watermark for `kind`, stored with second precision
    pub async fn set_watermark(&self, kind: &str, at: DateTime<Utc>) -> Result<()> {
        self.storage
            .set(&Self::watermark_key(kind), &at.timestamp().to_string())
            .await
    }

    /// Ids already written by the still-open run for `kind`
    pub async fn loaded_ids(&self, kind: &str) -> Result<Vec<Uuid>> {
        let key = Self::loaded_ids_key(kind);
        let mut ids = Vec::new();
        for member in self.storage.members(&key).await? {
            let id = member.parse().map_err(|_| EtlError::CorruptState {
                key: key.clone(),
                reason: format!("not a uuid: {member:?}"),
            })?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Merge freshly written document ids into the in-flight set for `kind`
    pub async fn add_loaded_ids(&self, kind: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.storage
            .add_members(&Self::loaded_ids_key(kind), ids)
            .await
    }

    /// Drop the in-flight id set for `kind` (run finished)
    pub async fn clear_loaded_ids(&self, kind: &str) -> Result<()> {
        self.storage.remove(&Self::loaded_ids_key(kind)).await
    }
}
