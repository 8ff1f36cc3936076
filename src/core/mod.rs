pub mod error;
pub mod types;
pub mod value;

pub use error::{Result, StateError};
pub use types::{CollectionState, NewCollectionState, StateId, StatePatch};
pub use value::{FieldValue, StateField};
