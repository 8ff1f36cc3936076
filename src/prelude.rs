//! Everything a collection job needs to track asset state.
//!
//! ```
//! use collection_state::prelude::*;
//! ```

pub use crate::{
    CollectionContext, CollectionState, CollectionStateStore, Condition, CreateOutcome,
    InMemoryStateBackend, MarkMissedOutcome, MissingContext, Operator, ResetOutcome, Result,
    SortKey, StateBackend, StateError, StateFilter, StatePatch, StateQuery, StateSet,
    StateStoreConfig, Transaction, TransactionMeta,
};
