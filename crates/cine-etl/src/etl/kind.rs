//! Entity kind contract
//!
//! Each synced kind supplies a small, fully static configuration: the two
//! SQL texts, the index it writes to, its state key prefix and its
//! denormalized row type. The pipeline stages are generic over this trait,
//! so adding a kind means adding one module, not another pipeline
//! implementation.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use uuid::Uuid;

/// Static configuration of one synced entity kind
pub trait EntityKind: Send + Sync + 'static {
    /// Denormalized row: decoded from the rows query, serialized as the
    /// search document body (index field names)
    type Row: Serialize + for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static;

    /// State key prefix (`<KIND>:last_run_at`, `<KIND>:last_ids`)
    const KIND: &'static str;

    /// Target index name
    const INDEX: &'static str;

    /// Change detection query
    ///
    /// Selects the distinct ids whose own row or joined dependents were
    /// modified after `$1`, excluding `$2::uuid[]` (ids this run already
    /// wrote). The excluded id column is part of the static text, never
    /// substituted at runtime.
    const CHANGED_IDS_SQL: &'static str;

    /// Denormalization query: full rows for `$1::uuid[]`, aggregating
    /// joined sub-entities server-side
    const ROWS_SQL: &'static str;

    /// Settings+mappings body for [`Self::INDEX`]
    fn index_definition() -> serde_json::Value;

    /// Identity of a row, used as the document id
    fn document_id(row: &Self::Row) -> Uuid;
}

/// Decode a `json_agg` column into a vector, treating SQL NULL as empty
///
/// Aggregates over empty join branches come back NULL instead of `[]`;
/// rows never carry null sub-lists, so the gap closes here.
pub(crate) fn decode_json_list<T: DeserializeOwned>(
    row: &PgRow,
    column: &str,
) -> sqlx::Result<Vec<T>> {
    Ok(row
        .try_get::<Option<Json<Vec<T>>>, _>(column)?
        .map(|Json(values)| values)
        .unwrap_or_default())
}

/// Decode an `array_agg` text column, treating SQL NULL as empty
pub(crate) fn decode_text_array(row: &PgRow, column: &str) -> sqlx::Result<Vec<String>> {
    Ok(row
        .try_get::<Option<Vec<String>>, _>(column)?
        .unwrap_or_default())
}
