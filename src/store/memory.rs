use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Entity, LedgerError, Result};
use crate::ledger::Transition;
use crate::models::*;
use crate::store::{LedgerStore, TransactionFilter, TransitionInput};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    categories: BTreeMap<i64, SpendingCategory>,
    vendors: BTreeMap<i64, Vendor>,
    allocations: BTreeMap<i64, Allocation>,
    transactions: BTreeMap<i64, Transaction>,
    approvals: Vec<Approval>,
    alerts: BTreeMap<i64, FraudAlert>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store. Clones share the same data, so each clone acts as a
/// separate session against one backing store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Writes happen only after all checks pass, so a poisoned lock
        // still holds consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LedgerStore for MemoryStore {
    // ── Categories ────────────────────────────────────────────

    fn insert_category(&mut self, category: &SpendingCategory) -> Result<i64> {
        let mut state = self.lock();
        let lower = category.name.to_lowercase();
        if state
            .categories
            .values()
            .any(|c| c.name.to_lowercase() == lower)
        {
            return Err(LedgerError::validation(
                "name",
                format!("category '{}' already exists", category.name),
            ));
        }
        let id = state.next_id();
        let mut stored = category.clone();
        stored.id = Some(id);
        state.categories.insert(id, stored);
        Ok(id)
    }

    fn get_category(&self, id: i64) -> Result<Option<SpendingCategory>> {
        Ok(self.lock().categories.get(&id).cloned())
    }

    fn get_categories(&self) -> Result<Vec<SpendingCategory>> {
        let mut cats: Vec<_> = self.lock().categories.values().cloned().collect();
        cats.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cats)
    }

    // ── Vendors ───────────────────────────────────────────────

    fn insert_vendor(&mut self, vendor: &Vendor) -> Result<i64> {
        let mut state = self.lock();
        let id = state.next_id();
        let mut stored = vendor.clone();
        stored.id = Some(id);
        state.vendors.insert(id, stored);
        Ok(id)
    }

    fn get_vendor(&self, id: i64) -> Result<Option<Vendor>> {
        Ok(self.lock().vendors.get(&id).cloned())
    }

    fn get_vendors(&self) -> Result<Vec<Vendor>> {
        let mut vendors: Vec<_> = self.lock().vendors.values().cloned().collect();
        vendors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vendors)
    }

    // ── Allocations ───────────────────────────────────────────

    fn insert_allocation(&mut self, allocation: &Allocation) -> Result<i64> {
        let mut state = self.lock();
        let id = state.next_id();
        let mut stored = allocation.clone();
        stored.id = Some(id);
        state.allocations.insert(id, stored);
        Ok(id)
    }

    fn get_allocation(&self, id: i64) -> Result<Option<Allocation>> {
        Ok(self.lock().allocations.get(&id).cloned())
    }

    fn get_allocations(&self) -> Result<Vec<Allocation>> {
        Ok(self.lock().allocations.values().rev().cloned().collect())
    }

    // ── Transactions ──────────────────────────────────────────

    fn insert_transaction(&mut self, txn: &Transaction) -> Result<i64> {
        let mut state = self.lock();
        let id = state.next_id();
        let mut stored = txn.clone();
        stored.id = Some(id);
        state.transactions.insert(id, stored);
        Ok(id)
    }

    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.lock().transactions.get(&id).cloned())
    }

    fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let state = self.lock();
        let mut txns: Vec<_> = state
            .transactions
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        txns.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        if let Some(limit) = filter.limit {
            txns.truncate(limit as usize);
        }
        Ok(txns)
    }

    fn annotate_transaction(
        &mut self,
        id: i64,
        expected: TransactionStatus,
        reason: &str,
    ) -> Result<bool> {
        let mut state = self.lock();
        match state.transactions.get_mut(&id) {
            Some(txn) if txn.status == expected => {
                txn.status_reason = Some(reason.to_string());
                txn.updated_at = chrono::Utc::now().to_rfc3339();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn commit_transition<F>(&mut self, transaction_id: i64, decide: F) -> Result<Transition>
    where
        F: FnOnce(&TransitionInput) -> Result<Transition>,
    {
        let mut state = self.lock();

        let transaction = state
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(Entity::Transaction, transaction_id))?;
        let allocation = state
            .allocations
            .get(&transaction.allocation_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(Entity::Allocation, transaction.allocation_id))?;
        let category = transaction
            .category_id
            .and_then(|id| state.categories.get(&id).cloned());
        let vendor = transaction
            .vendor_id
            .and_then(|id| state.vendors.get(&id).cloned());

        let input = TransitionInput {
            transaction,
            allocation,
            category,
            vendor,
        };
        let mut transition = decide(&input)?;

        // Same conditions as the conditional UPDATEs in `Database`.
        let current = state.transactions.get(&transaction_id).map(|t| t.status);
        if current != Some(input.transaction.status) {
            return Err(LedgerError::InvalidTransition {
                transaction_id,
                from: current.unwrap_or(input.transaction.status),
                to: transition.transaction.status,
            });
        }
        if let Some(debited) = &transition.allocation {
            let seen = input.allocation.remaining_amount();
            let still = state
                .allocations
                .get(&input.allocation.id.unwrap_or_default())
                .map(|a| a.remaining_amount());
            if still != Some(seen) || debited.remaining_amount() + transition.debited() != seen {
                return Err(LedgerError::Conflict {
                    allocation_id: debited.id.unwrap_or_default(),
                });
            }
        }

        if let Some(debited) = &transition.allocation {
            state
                .allocations
                .insert(debited.id.unwrap_or_default(), debited.clone());
        }
        state
            .transactions
            .insert(transaction_id, transition.transaction.clone());
        let approval_id = state.next_id();
        transition.approval.id = Some(approval_id);
        state.approvals.push(transition.approval.clone());

        Ok(transition)
    }

    fn get_approvals(&self, transaction_id: i64) -> Result<Vec<Approval>> {
        Ok(self
            .lock()
            .approvals
            .iter()
            .filter(|a| a.transaction_id == transaction_id)
            .cloned()
            .collect())
    }

    // ── Alerts ────────────────────────────────────────────────

    fn insert_alert(&mut self, alert: &FraudAlert) -> Result<i64> {
        let mut state = self.lock();
        let id = state.next_id();
        let mut stored = alert.clone();
        stored.id = Some(id);
        state.alerts.insert(id, stored);
        Ok(id)
    }

    fn get_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<FraudAlert>> {
        Ok(self
            .lock()
            .alerts
            .values()
            .rev()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect())
    }

    fn update_alert_status(&mut self, id: i64, status: AlertStatus) -> Result<()> {
        let mut state = self.lock();
        let alert = state
            .alerts
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found(Entity::Alert, id))?;
        alert.status = status;
        alert.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
