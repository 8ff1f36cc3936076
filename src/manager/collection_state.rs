use super::context::{CollectionContext, MissingContext};
use crate::config::StateStoreConfig;
use crate::core::{CollectionState, NewCollectionState, Result, StateField, StatePatch};
use crate::query::{Condition, Operator, StateFilter, StateQuery, StateSet};
use crate::storage::StateBackend;
use crate::transaction::{Compensation, Transaction};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(CollectionState),
    Skipped(MissingContext),
}

impl CreateOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }

    pub fn state(&self) -> Option<&CollectionState> {
        match self {
            CreateOutcome::Created(state) => Some(state),
            CreateOutcome::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset(CollectionState),
    Skipped(MissingContext),
}

impl ResetOutcome {
    pub fn is_reset(&self) -> bool {
        matches!(self, ResetOutcome::Reset(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkMissedOutcome {
    /// Records whose miss counter was incremented, after the increment.
    Marked(StateSet),
    Skipped(MissingContext),
}

/// Per-job facade over the collection state records of one collector run.
///
/// The store is cheap to build and meant to live for a single job; the
/// records themselves belong to the backend.
///
/// # Examples
///
/// ```
/// use collection_state::{CollectionContext, CollectionStateStore, InMemoryStateBackend};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> collection_state::Result<()> {
/// let context = CollectionContext::new()
///     .collector_id("col1")
///     .job_task_id("job1")
///     .secret_id("sec1");
/// let store = CollectionStateStore::new(Arc::new(InMemoryStateBackend::new()), context);
///
/// store.create("i-1", "dom1", None).await?;
/// let state = store.find("i-1", "dom1").await?.expect("created above");
/// assert_eq!(state.job_task_id, "job1");
/// # Ok(())
/// # }
/// ```
pub struct CollectionStateStore<B: StateBackend> {
    backend: Arc<B>,
    context: CollectionContext,
    config: StateStoreConfig,
}

impl<B: StateBackend> CollectionStateStore<B> {
    pub fn new(backend: Arc<B>, context: CollectionContext) -> Self {
        Self {
            backend,
            context,
            config: StateStoreConfig::default(),
        }
    }

    /// Build a store whose context comes from the transaction's metadata.
    pub fn from_transaction(backend: Arc<B>, tx: &Transaction) -> Self {
        Self::new(backend, CollectionContext::from_meta(tx.meta()))
    }

    pub fn with_config(mut self, config: StateStoreConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn context(&self) -> &CollectionContext {
        &self.context
    }

    pub fn config(&self) -> &StateStoreConfig {
        &self.config
    }

    /// Start tracking `asset_id` for the current collector run.
    ///
    /// Skipped unless collector, job and secret are all known. Does not check
    /// for an existing record; callers look one up with `find` first.
    pub async fn create(
        &self,
        asset_id: &str,
        domain_id: &str,
        tx: Option<&mut Transaction>,
    ) -> Result<CreateOutcome> {
        let (collector_id, job_task_id, secret_id) = match self.context.require_all() {
            Ok(ids) => ids,
            Err(missing) => {
                debug!(asset_id, domain_id, missing = %missing, "skipping collection state create");
                return Ok(CreateOutcome::Skipped(missing));
            }
        };
        if let Some(tx) = tx.as_deref() {
            tx.ensure_active()?;
        }

        let state = self
            .backend
            .insert(NewCollectionState {
                collector_id: collector_id.to_string(),
                job_task_id: job_task_id.to_string(),
                secret_id: secret_id.to_string(),
                asset_id: asset_id.to_string(),
                domain_id: domain_id.to_string(),
            })
            .await?;
        info!(state_id = %state.id, asset_id, collector_id, "created collection state");

        if let Some(tx) = tx {
            tx.register_compensation(Compensation::RemoveCreated {
                state: state.clone(),
            })?;
        }
        Ok(CreateOutcome::Created(state))
    }

    /// Apply `patch` to `state`, updating the caller's copy in place.
    ///
    /// The caller's copy is the snapshot: its pre-update value is what
    /// rollback writes back, even if the stored record has since diverged.
    pub async fn update(
        &self,
        patch: StatePatch,
        state: &mut CollectionState,
        tx: Option<&mut Transaction>,
    ) -> Result<CollectionState> {
        patch.validate()?;
        if let Some(tx) = tx.as_deref() {
            tx.ensure_active()?;
        }
        if patch.is_empty() {
            debug!(state_id = %state.id, "empty collection state patch");
        }

        let snapshot = state.clone();
        let updated = self.backend.update(state.id, &patch).await?;

        if let Some(tx) = tx {
            tx.register_compensation(Compensation::RestoreSnapshot { snapshot })?;
        }
        *state = updated.clone();
        Ok(updated)
    }

    /// Mark `state` as seen in the current job: clear the miss counter and
    /// move it onto the current job task.
    pub async fn reset_miss_counter(
        &self,
        state: &mut CollectionState,
        tx: Option<&mut Transaction>,
    ) -> Result<ResetOutcome> {
        let job_task_id = match self.context.require_job() {
            Ok(job_task_id) => job_task_id,
            Err(missing) => {
                debug!(state_id = %state.id, "skipping miss counter reset: no job_task_id");
                return Ok(ResetOutcome::Skipped(missing));
            }
        };

        let patch = StatePatch::new()
            .disconnected_count(0)
            .job_task_id(job_task_id);
        let updated = self.update(patch, state, tx).await?;
        Ok(ResetOutcome::Reset(updated))
    }

    /// Look up the record for `asset_id` under the current collector and secret.
    ///
    /// Returns `None` when either is unknown. If duplicates exist, the most
    /// recently created one (highest `StateId`) is returned.
    pub async fn find(&self, asset_id: &str, domain_id: &str) -> Result<Option<CollectionState>> {
        let Ok((collector_id, secret_id)) = self.context.require_source() else {
            return Ok(None);
        };

        let filter = StateFilter::new()
            .collector_id(collector_id)
            .secret_id(secret_id)
            .asset_id(asset_id)
            .domain_id(domain_id);
        let matches = self.backend.filter(&filter).await?;

        if matches.len() > 1 {
            warn!(
                asset_id,
                domain_id,
                collector_id,
                duplicates = matches.len(),
                "duplicate collection states found"
            );
        }
        Ok(matches.into_iter().max_by_key(|state| state.id))
    }

    pub async fn filter(&self, filter: &StateFilter) -> Result<StateSet> {
        Ok(StateSet::new(self.backend.filter(filter).await?))
    }

    /// Run a structured query, returning the page and the total match count.
    pub async fn list(&self, query: &StateQuery) -> Result<(StateSet, u64)> {
        let (items, total) = match (query.page, self.config.default_page_limit) {
            (None, Some(limit)) if !query.count_only => {
                let paged = query.clone().page(1, limit);
                self.backend.query(&paged).await?
            }
            _ => self.backend.query(query).await?,
        };
        Ok((StateSet::new(items), total))
    }

    pub async fn delete_by_asset_id(
        &self,
        resource_id: &str,
        domain_id: &str,
        tx: Option<&mut Transaction>,
    ) -> Result<u64> {
        let filter = StateFilter::new().asset_id(resource_id).domain_id(domain_id);
        self.delete_matching(filter, tx).await
    }

    /// Delete every record for the given assets in any domain.
    pub async fn delete_by_asset_ids<I, S>(
        &self,
        asset_ids: I,
        tx: Option<&mut Transaction>,
    ) -> Result<u64>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = StateFilter::new().asset_ids(asset_ids);
        self.delete_matching(filter, tx).await
    }

    /// Delete every record a collector produced in `domain_id`.
    pub async fn delete_by_collector_id(
        &self,
        collector_id: &str,
        domain_id: &str,
        tx: Option<&mut Transaction>,
    ) -> Result<u64> {
        let filter = StateFilter::new()
            .collector_id(collector_id)
            .domain_id(domain_id);
        self.delete_matching(filter, tx).await
    }

    /// Increment the miss counter of every record in `domain_id` that the
    /// current job has not reset. Call once per job, after all resets.
    pub async fn mark_missed(
        &self,
        domain_id: &str,
        mut tx: Option<&mut Transaction>,
    ) -> Result<MarkMissedOutcome> {
        let (collector_id, job_task_id, secret_id) = match self.context.require_all() {
            Ok(ids) => ids,
            Err(missing) => {
                debug!(domain_id, missing = %missing, "skipping miss marking");
                return Ok(MarkMissedOutcome::Skipped(missing));
            }
        };

        let query = StateQuery::new()
            .filter(Condition::equals(StateField::CollectorId, collector_id))
            .filter(Condition::equals(StateField::SecretId, secret_id))
            .filter(Condition::equals(StateField::DomainId, domain_id))
            .filter(Condition::new(StateField::JobTaskId, Operator::NotEq, job_task_id));
        let (missed, _) = self.backend.query(&query).await?;

        let mut marked = Vec::with_capacity(missed.len());
        for mut state in missed {
            let patch =
                StatePatch::new().disconnected_count(state.disconnected_count.saturating_add(1));
            marked.push(self.update(patch, &mut state, tx.as_deref_mut()).await?);
        }

        info!(
            domain_id,
            collector_id,
            job_task_id,
            missed = marked.len(),
            "marked missed collection states"
        );
        Ok(MarkMissedOutcome::Marked(StateSet::new(marked)))
    }

    /// Records of the current collector and secret whose miss counter has
    /// reached the configured threshold. Empty when either is unknown.
    pub async fn list_disconnected(&self, domain_id: &str) -> Result<StateSet> {
        let Ok((collector_id, secret_id)) = self.context.require_source() else {
            return Ok(StateSet::default());
        };

        let query = StateQuery::new()
            .filter(Condition::equals(StateField::CollectorId, collector_id))
            .filter(Condition::equals(StateField::SecretId, secret_id))
            .filter(Condition::equals(StateField::DomainId, domain_id))
            .filter(Condition::new(
                StateField::DisconnectedCount,
                Operator::Gte,
                self.config.disconnected_threshold,
            ));
        let (items, _) = self.backend.query(&query).await?;
        Ok(StateSet::new(items))
    }

    async fn delete_matching(
        &self,
        filter: StateFilter,
        tx: Option<&mut Transaction>,
    ) -> Result<u64> {
        let deleted = match tx {
            Some(tx) => {
                tx.ensure_active()?;
                let doomed = self.backend.filter(&filter).await?;
                let deleted = self.backend.delete_matching(&filter).await?;
                for snapshot in doomed {
                    tx.register_compensation(Compensation::RestoreSnapshot { snapshot })?;
                }
                deleted
            }
            None => self.backend.delete_matching(&filter).await?,
        };

        info!(?filter, deleted, "deleted collection states");
        Ok(deleted)
    }
}
