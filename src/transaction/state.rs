// ============================================================================
// Transaction State Management
// ============================================================================
//
// A Transaction is an explicit unit of work owned by the caller. Operations
// that mutate collection state register a Compensation with it; on failure
// the caller rolls the transaction back, which replays the compensations in
// reverse registration order.
//
// State transitions:
//   Active ──commit──> Committed
//     │
//     └──rollback──> RolledBack
//
// ============================================================================

use super::Compensation;
use crate::core::{Result, StateError};
use crate::storage::StateBackend;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info};

/// Global transaction ID counter
static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Generate a new unique transaction ID
    pub fn new() -> Self {
        TransactionId(NEXT_TXN_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Active => write!(f, "ACTIVE"),
            TransactionState::Committed => write!(f, "COMMITTED"),
            TransactionState::RolledBack => write!(f, "ROLLED BACK"),
        }
    }
}

/// Read-only metadata attached to a transaction by the job that opened it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionMeta {
    values: HashMap<String, String>,
}

impl TransactionMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Outcome of replaying a transaction's compensations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub applied: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct Transaction {
    id: TransactionId,
    state: TransactionState,
    meta: TransactionMeta,
    compensations: Vec<Compensation>,
    start_time: std::time::Instant,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    pub fn new() -> Self {
        Self::with_meta(TransactionMeta::new())
    }

    pub fn with_meta(meta: TransactionMeta) -> Self {
        Self {
            id: TransactionId::new(),
            state: TransactionState::Active,
            meta,
            compensations: Vec::new(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn meta(&self) -> &TransactionMeta {
        &self.meta
    }

    pub fn compensations(&self) -> &[Compensation] {
        &self.compensations
    }

    pub fn compensation_count(&self) -> usize {
        self.compensations.len()
    }

    pub fn duration(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Fails unless the transaction can still accept compensations.
    pub fn ensure_active(&self) -> Result<()> {
        if !self.state.is_active() {
            return Err(StateError::TransactionError(format!(
                "Cannot register compensation: transaction {} is {}",
                self.id, self.state
            )));
        }
        Ok(())
    }

    /// Append a compensating action.
    ///
    /// # Errors
    /// Returns error if transaction is not active
    pub fn register_compensation(&mut self, compensation: Compensation) -> Result<()> {
        self.ensure_active()?;

        debug!(txn = %self.id, action = %compensation.describe(), "registered compensation");
        self.compensations.push(compensation);
        Ok(())
    }

    /// Mark transaction as committed and drop its compensations
    ///
    /// # Errors
    /// Returns error if transaction is not active
    pub fn commit(&mut self) -> Result<()> {
        if !self.state.is_active() {
            return Err(StateError::TransactionError(format!(
                "Cannot commit: transaction {} is already {}",
                self.id, self.state
            )));
        }

        self.compensations.clear();
        self.state = TransactionState::Committed;
        Ok(())
    }

    /// Run every registered compensation, newest first.
    ///
    /// A failing compensation is logged and counted; the remaining ones still
    /// run.
    ///
    /// # Errors
    /// Returns error if transaction is not active
    pub async fn rollback(&mut self, backend: &dyn StateBackend) -> Result<RollbackReport> {
        if !self.state.is_active() {
            return Err(StateError::TransactionError(format!(
                "Cannot rollback: transaction {} is already {}",
                self.id, self.state
            )));
        }

        let mut report = RollbackReport::default();
        while let Some(compensation) = self.compensations.pop() {
            match compensation.apply(backend).await {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    error!(
                        txn = %self.id,
                        error = %e,
                        "[ROLLBACK] {} failed",
                        compensation.describe()
                    );
                    report.failed += 1;
                }
            }
        }

        self.state = TransactionState::RolledBack;
        info!(
            txn = %self.id,
            applied = report.applied,
            failed = report.failed,
            elapsed_ms = self.duration().as_millis() as u64,
            "transaction rolled back"
        );
        Ok(report)
    }
}
