// ============================================================================
// Collection State Library
// ============================================================================

//! Tracks, per discovered asset, whether the asset was seen in the latest
//! run of the collector that reported it.
//!
//! Each record is keyed by `(collector_id, secret_id, asset_id, domain_id)`
//! and carries the job task that last observed it plus a miss counter
//! (`disconnected_count`). A collection job builds a [`CollectionStateStore`]
//! for its run, creates records for new assets, resets the counter for
//! assets it sees again, and marks the rest as missed.
//!
//! Mutations can join a [`Transaction`]. Each one registers a compensating
//! action, and rolling the transaction back undoes them newest first.
//!
//! ```
//! use collection_state::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> collection_state::Result<()> {
//! let backend = Arc::new(InMemoryStateBackend::new());
//! let meta = TransactionMeta::new()
//!     .set_meta("collector_id", "col1")
//!     .set_meta("job_task_id", "job1")
//!     .set_meta("secret.secret_id", "sec1");
//! let mut tx = Transaction::with_meta(meta);
//! let store = CollectionStateStore::from_transaction(backend.clone(), &tx);
//!
//! let outcome = store.create("i-1", "dom1", Some(&mut tx)).await?;
//! assert!(outcome.is_created());
//!
//! // A later step failed: undo everything registered so far.
//! tx.rollback(&*backend).await?;
//! assert!(store.find("i-1", "dom1").await?.is_none());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod manager;
pub mod prelude;
pub mod query;
pub mod storage;
pub mod transaction;

pub use config::StateStoreConfig;
pub use core::{
    CollectionState, FieldValue, NewCollectionState, Result, StateError, StateField, StateId,
    StatePatch,
};
pub use manager::{
    CollectionContext, CollectionStateStore, CreateOutcome, MarkMissedOutcome, MissingContext,
    ResetOutcome,
};
pub use query::{Condition, Operator, Page, SortKey, StateFilter, StateQuery, StateSet};
pub use storage::{InMemoryStateBackend, StateBackend};
pub use transaction::{
    Compensation, RollbackReport, Transaction, TransactionId, TransactionMeta, TransactionState,
};
