pub mod engine;
pub mod memory;

pub use engine::StateBackend;
pub use memory::InMemoryStateBackend;
