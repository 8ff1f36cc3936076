pub mod condition;
pub mod filter;
pub mod query;
pub mod set;

pub use condition::{Condition, Operator};
pub use filter::StateFilter;
pub use query::{Page, SortKey, StateQuery};
pub use set::StateSet;
