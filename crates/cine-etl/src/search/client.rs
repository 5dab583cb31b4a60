//! HTTP client for the search engine

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{EtlError, Result};

/// One document write, addressed by index and document id
#[derive(Debug, Clone)]
pub struct WriteAction {
    pub index: &'static str,
    pub id: String,
    pub body: Value,
}

/// Per-document result of a bulk write
#[derive(Debug, Clone)]
pub struct FailedDocument {
    pub id: String,
    pub status: u16,
    pub reason: String,
}

/// Outcome of a bulk write, partitioned by document
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedDocument>,
}

/// Client for the search engine's REST API
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    index_create_timeout: String,
}

impl SearchClient {
    /// Create a new client from the search section of the configuration
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            index_create_timeout: config.index_create_timeout.clone(),
        })
    }

    /// Create an index with the given settings+mappings body
    ///
    /// Succeeds when the index was created or already exists; any other
    /// rejection propagates.
    pub async fn ensure_index(&self, name: &str, definition: &Value) -> Result<()> {
        let url = format!(
            "{}/{}?timeout={}",
            self.base_url, name, self.index_create_timeout
        );
        let response = self.http.put(&url).json(definition).send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(index = name, "index created");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 400 && body.contains("resource_already_exists_exception") {
            debug!(index = name, "index already exists");
            return Ok(());
        }

        Err(EtlError::SearchRejected {
            operation: format!("create index '{name}'"),
            status: status.as_u16(),
            body,
        })
    }

    /// Bulk-upsert the given actions
    ///
    /// The HTTP call failing as a whole is an error; an accepted call is
    /// parsed into per-document outcomes, leaving the retry decision to the
    /// caller.
    pub async fn bulk(&self, actions: &[WriteAction]) -> Result<BulkOutcome> {
        let url = format!("{}/_bulk", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(ndjson_payload(actions)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::SearchRejected {
                operation: "bulk write".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: BulkResponse = response.json().await?;
        Ok(partition_bulk_response(body))
    }
}

/// Serialize actions into the bulk API's newline-delimited format
fn ndjson_payload(actions: &[WriteAction]) -> Result<String> {
    let mut payload = String::new();
    for action in actions {
        let header = json!({"index": {"_index": action.index, "_id": action.id}});
        payload.push_str(&serde_json::to_string(&header)?);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(&action.body)?);
        payload.push('\n');
    }
    Ok(payload)
}

/// Split a bulk response into succeeded and failed document ids
fn partition_bulk_response(response: BulkResponse) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();
    for item in response.items {
        let Some(result) = item.result() else {
            continue;
        };
        if result.status < 300 && result.error.is_none() {
            outcome.succeeded.push(result.id.clone());
        } else {
            outcome.failed.push(FailedDocument {
                id: result.id.clone(),
                status: result.status,
                reason: result
                    .error
                    .as_ref()
                    .map(|e| {
                        let reason = e.reason.as_deref().unwrap_or("unknown");
                        format!("{}: {}", e.kind, reason)
                    })
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }
    }
    outcome
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[allow(dead_code)]
    errors: bool,
    #[serde(default)]
    items: Vec<BulkItem>,
}

/// Bulk items are keyed by the operation that produced them
#[derive(Debug, Deserialize)]
struct BulkItem {
    index: Option<BulkItemResult>,
    create: Option<BulkItemResult>,
}

impl BulkItem {
    fn result(&self) -> Option<&BulkItemResult> {
        self.index.as_ref().or(self.create.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct BulkItemResult {
    #[serde(rename = "_id")]
    id: String,
    status: u16,
    error: Option<BulkItemError>,
}

#[derive(Debug, Deserialize)]
struct BulkItemError {
    #[serde(rename = "type")]
    kind: String,
    reason: Option<String>,
}
