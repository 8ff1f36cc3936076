// ============================================================================
// Compensating Actions
// ============================================================================
//
// Command Pattern for reversible collection state operations. A transaction
// records one Compensation per mutation and runs them in reverse order on
// rollback.
//
// ============================================================================

use crate::core::{CollectionState, Result};
use crate::storage::StateBackend;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Undo a create by removing the new record.
    RemoveCreated { state: CollectionState },

    /// Undo an update by writing the pre-update record back.
    RestoreSnapshot { snapshot: CollectionState },
}

impl Compensation {
    /// The record this compensation acts on
    pub fn target(&self) -> &CollectionState {
        match self {
            Compensation::RemoveCreated { state } => state,
            Compensation::RestoreSnapshot { snapshot } => snapshot,
        }
    }

    pub fn describe(&self) -> String {
        let target = self.target();
        match self {
            Compensation::RemoveCreated { .. } => format!(
                "Delete collection state: asset_id = {}, collector_id = {}",
                target.asset_id, target.collector_id
            ),
            Compensation::RestoreSnapshot { .. } => format!(
                "Revert collection state: asset_id = {}, collector_id = {}",
                target.asset_id, target.collector_id
            ),
        }
    }

    pub async fn apply(&self, backend: &dyn StateBackend) -> Result<()> {
        let target = self.target();
        info!(
            state_id = %target.id,
            asset_id = %target.asset_id,
            collector_id = %target.collector_id,
            "[ROLLBACK] {}",
            self.describe()
        );

        match self {
            Compensation::RemoveCreated { state } => {
                backend.delete_by_id(state.id).await?;
            }
            Compensation::RestoreSnapshot { snapshot } => {
                backend.restore(snapshot.clone()).await?;
            }
        }
        Ok(())
    }
}
