pub mod collection_state;
pub mod context;

pub use collection_state::{CollectionStateStore, CreateOutcome, MarkMissedOutcome, ResetOutcome};
pub use context::{CollectionContext, MissingContext};
