//! Document loading and progress recording

use std::marker::PhantomData;

use tracing::{debug, warn};

use super::kind::EntityKind;
use crate::error::{EtlError, Result};
use crate::search::{SearchClient, WriteAction};
use crate::state::SyncState;

/// Writes one kind's documents into its index
///
/// Every load first makes sure the target index exists with the kind's
/// fixed mapping (a no-op after the first cycle), then bulk-upserts the
/// batch and merges the ids the engine accepted into the kind's in-flight
/// set. The state update strictly follows the bulk write: a crash between
/// the two leaves the set stale-but-safe, costing a redundant re-fetch on
/// the next run rather than a lost document.
pub struct Loader<K: EntityKind> {
    search: SearchClient,
    state: SyncState,
    _kind: PhantomData<K>,
}

impl<K: EntityKind> Loader<K> {
    pub fn new(search: SearchClient, state: SyncState) -> Self {
        Self {
            search,
            state,
            _kind: PhantomData,
        }
    }

    /// Write a batch of actions and record the accepted ids
    ///
    /// Rejected documents are logged id by id and surface as an error after
    /// the accepted ids were recorded, so the aborted run re-selects only
    /// what actually failed.
    pub async fn load(&self, actions: &[WriteAction]) -> Result<()> {
        self.search
            .ensure_index(K::INDEX, &K::index_definition())
            .await?;

        let outcome = self.search.bulk(actions).await?;

        self.state
            .add_loaded_ids(K::KIND, &outcome.succeeded)
            .await?;

        debug!(
            kind = K::KIND,
            accepted = outcome.succeeded.len(),
            "recorded batch progress"
        );

        if !outcome.failed.is_empty() {
            for failure in &outcome.failed {
                warn!(
                    kind = K::KIND,
                    id = %failure.id,
                    status = failure.status,
                    reason = %failure.reason,
                    "document rejected by bulk write"
                );
            }
            return Err(EtlError::BulkRejected {
                index: K::INDEX,
                failed: outcome.failed.len(),
                total: actions.len(),
            });
        }

        Ok(())
    }
}
