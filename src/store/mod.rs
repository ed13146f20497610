//! Persistence seam. The engine is handed a `LedgerStore` explicitly;
//! nothing reaches for ambient global state.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::ledger::Transition;
use crate::models::*;

/// Optional filters for transaction listings. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub allocation_id: Option<i64>,
    pub status: Option<TransactionStatus>,
    pub limit: Option<u32>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        self.allocation_id.map_or(true, |id| txn.allocation_id == id)
            && self.status.map_or(true, |s| txn.status == s)
    }
}

/// Everything a transition decision may look at, loaded under the same
/// exclusive access the resulting writes are made under.
#[derive(Debug, Clone)]
pub struct TransitionInput {
    pub transaction: Transaction,
    pub allocation: Allocation,
    pub category: Option<SpendingCategory>,
    pub vendor: Option<Vendor>,
}

pub trait LedgerStore {
    // ── Categories ────────────────────────────────────────────
    fn insert_category(&mut self, category: &SpendingCategory) -> Result<i64>;
    fn get_category(&self, id: i64) -> Result<Option<SpendingCategory>>;
    fn get_categories(&self) -> Result<Vec<SpendingCategory>>;

    // ── Vendors ───────────────────────────────────────────────
    fn insert_vendor(&mut self, vendor: &Vendor) -> Result<i64>;
    fn get_vendor(&self, id: i64) -> Result<Option<Vendor>>;
    fn get_vendors(&self) -> Result<Vec<Vendor>>;

    // ── Allocations ───────────────────────────────────────────
    fn insert_allocation(&mut self, allocation: &Allocation) -> Result<i64>;
    fn get_allocation(&self, id: i64) -> Result<Option<Allocation>>;
    fn get_allocations(&self) -> Result<Vec<Allocation>>;

    // ── Transactions ──────────────────────────────────────────
    fn insert_transaction(&mut self, txn: &Transaction) -> Result<i64>;
    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;
    fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    /// Set `status_reason` without changing the status, provided the
    /// transaction is still in `expected`. Returns whether a row changed.
    fn annotate_transaction(
        &mut self,
        id: i64,
        expected: TransactionStatus,
        reason: &str,
    ) -> Result<bool>;

    /// Load the transaction with its allocation, category and vendor, let
    /// `decide` compute the transition, and persist it atomically.
    ///
    /// The status write is conditional on the status `decide` saw
    /// (`InvalidTransition` otherwise). The allocation write is conditional
    /// on the stored `remaining_amount` still being the one loaded, and the
    /// new balance must equal it minus the transaction amount (`Conflict`
    /// otherwise). When `decide` fails nothing is written.
    fn commit_transition<F>(&mut self, transaction_id: i64, decide: F) -> Result<Transition>
    where
        F: FnOnce(&TransitionInput) -> Result<Transition>;

    fn get_approvals(&self, transaction_id: i64) -> Result<Vec<Approval>>;

    // ── Alerts ────────────────────────────────────────────────
    fn insert_alert(&mut self, alert: &FraudAlert) -> Result<i64>;
    fn get_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<FraudAlert>>;
    /// `NotFound` if no alert has this id.
    fn update_alert_status(&mut self, id: i64, status: AlertStatus) -> Result<()>;
}
