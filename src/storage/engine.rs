use crate::core::{CollectionState, NewCollectionState, Result, StateId, StatePatch};
use crate::query::{StateFilter, StateQuery};
use async_trait::async_trait;

/// Storage backend trait - allows pluggable record stores.
///
/// Errors are returned as-is to callers of `CollectionStateStore`.
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Insert a record and assign it the next `StateId`
    async fn insert(&self, state: NewCollectionState) -> Result<CollectionState>;

    /// Fetch a record by id
    async fn get(&self, id: StateId) -> Result<Option<CollectionState>>;

    /// All records matching `filter`, ascending by id
    async fn filter(&self, filter: &StateFilter) -> Result<Vec<CollectionState>>;

    /// Execute a structured query, returning the page and the total match count
    async fn query(&self, query: &StateQuery) -> Result<(Vec<CollectionState>, u64)>;

    /// Apply a partial update and refresh `updated_at`
    async fn update(&self, id: StateId, patch: &StatePatch) -> Result<CollectionState>;

    /// Write `snapshot` back verbatim, recreating it if it was deleted
    async fn restore(&self, snapshot: CollectionState) -> Result<()>;

    /// Remove a single record. Returns false if it did not exist.
    async fn delete_by_id(&self, id: StateId) -> Result<bool>;

    /// Remove every record matching `filter`, returning how many were removed
    async fn delete_matching(&self, filter: &StateFilter) -> Result<u64>;
}
