//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/cinesearch";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default search engine URL.
pub const DEFAULT_ELASTIC_URL: &str = "http://localhost:9200";

/// Default search engine request timeout in seconds.
pub const DEFAULT_ELASTIC_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default timeout passed to index-create calls.
pub const DEFAULT_INDEX_CREATE_TIMEOUT: &str = "3s";

/// Default Redis URL for the state backend.
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default delay between sync cycles in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Default number of denormalized rows per extraction batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// ETL service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub state: StateConfig,
    pub sync: SyncConfig,
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Search engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub url: String,
    pub request_timeout_secs: u64,
    pub index_create_timeout: String,
}

/// State backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    pub url: String,
}

/// Sync loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub refresh_interval_secs: u64,
    pub batch_size: usize,
}

impl EtlConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = EtlConfig {
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
            search: SearchConfig {
                url: std::env::var("ELASTIC_URL")
                    .unwrap_or_else(|_| DEFAULT_ELASTIC_URL.to_string()),
                request_timeout_secs: std::env::var("ELASTIC_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_ELASTIC_REQUEST_TIMEOUT_SECS),
                index_create_timeout: std::env::var("ELASTIC_INDEX_CREATE_TIMEOUT")
                    .unwrap_or_else(|_| DEFAULT_INDEX_CREATE_TIMEOUT.to_string()),
            },
            state: StateConfig {
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            },
            sync: SyncConfig {
                refresh_interval_secs: std::env::var("ETL_REFRESH_INTERVAL")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS),
                batch_size: std::env::var("ETL_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_BATCH_SIZE),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.search.url.is_empty() {
            anyhow::bail!("Search engine URL cannot be empty");
        }

        if self.state.url.is_empty() {
            anyhow::bail!("State backend URL cannot be empty");
        }

        if self.sync.batch_size == 0 {
            anyhow::bail!("Batch size must be greater than 0");
        }

        if self.sync.refresh_interval_secs == 0 {
            anyhow::bail!("Refresh interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            },
            search: SearchConfig {
                url: DEFAULT_ELASTIC_URL.to_string(),
                request_timeout_secs: DEFAULT_ELASTIC_REQUEST_TIMEOUT_SECS,
                index_create_timeout: DEFAULT_INDEX_CREATE_TIMEOUT.to_string(),
            },
            state: StateConfig {
                url: DEFAULT_REDIS_URL.to_string(),
            },
            sync: SyncConfig {
                refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
                batch_size: DEFAULT_BATCH_SIZE,
            },
        }
    }
}
