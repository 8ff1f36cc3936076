use super::StateBackend;
use crate::core::{CollectionState, NewCollectionState, Result, StateError, StateId, StatePatch};
use crate::query::{StateFilter, StateQuery};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Records {
    next_id: u64,
    rows: BTreeMap<StateId, CollectionState>,
}

/// In-memory backend. Iteration is always in ascending `StateId` order.
#[derive(Default)]
pub struct InMemoryStateBackend {
    records: RwLock<Records>,
}

impl InMemoryStateBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.rows.is_empty()
    }
}

#[async_trait]
impl StateBackend for InMemoryStateBackend {
    async fn insert(&self, state: NewCollectionState) -> Result<CollectionState> {
        state.validate()?;

        let mut records = self.records.write().await;
        records.next_id += 1;
        let id = StateId(records.next_id);
        let state = state.into_state(id, Utc::now());
        records.rows.insert(id, state.clone());
        Ok(state)
    }

    async fn get(&self, id: StateId) -> Result<Option<CollectionState>> {
        Ok(self.records.read().await.rows.get(&id).cloned())
    }

    async fn filter(&self, filter: &StateFilter) -> Result<Vec<CollectionState>> {
        let records = self.records.read().await;
        Ok(records
            .rows
            .values()
            .filter(|state| filter.matches(state))
            .cloned()
            .collect())
    }

    async fn query(&self, query: &StateQuery) -> Result<(Vec<CollectionState>, u64)> {
        let records = self.records.read().await;
        query.execute(records.rows.values())
    }

    async fn update(&self, id: StateId, patch: &StatePatch) -> Result<CollectionState> {
        patch.validate()?;

        let mut records = self.records.write().await;
        let state = records.rows.get_mut(&id).ok_or(StateError::NotFound(id))?;
        patch.apply_to(state);
        state.updated_at = Utc::now();
        Ok(state.clone())
    }

    async fn restore(&self, snapshot: CollectionState) -> Result<()> {
        let mut records = self.records.write().await;
        // Keep ids unique if a restored record outlives the counter.
        records.next_id = records.next_id.max(snapshot.id.as_u64());
        records.rows.insert(snapshot.id, snapshot);
        Ok(())
    }

    async fn delete_by_id(&self, id: StateId) -> Result<bool> {
        Ok(self.records.write().await.rows.remove(&id).is_some())
    }

    async fn delete_matching(&self, filter: &StateFilter) -> Result<u64> {
        let mut records = self.records.write().await;
        let before = records.rows.len();
        records.rows.retain(|_, state| !filter.matches(state));
        Ok((before - records.rows.len()) as u64)
    }
}
