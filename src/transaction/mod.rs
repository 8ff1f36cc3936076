// ============================================================================
// Transaction Module
// ============================================================================
//
// Explicit unit of work carrying job metadata and a compensation log.
//
// Design Patterns Used:
// - State Pattern: Transaction state management (Active, Committed, RolledBack)
// - Command Pattern: Compensations replayed on rollback
//
// ============================================================================

pub mod compensation;
pub mod state;

pub use compensation::Compensation;
pub use state::{RollbackReport, Transaction, TransactionId, TransactionMeta, TransactionState};
