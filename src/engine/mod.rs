//! `BudgetEngine`: the operations officers invoke, over an injected
//! `LedgerStore`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::{Entity, LedgerError, Result};
use crate::ledger::{accounting, classify, lifecycle, policy, HealthTier};
use crate::models::*;
use crate::stats::DashboardStats;
use crate::store::{LedgerStore, TransactionFilter};

/// An allocation with its derived figures, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSummary {
    pub allocation: Allocation,
    pub spent: Decimal,
    pub usage_percent: f64,
    pub health: HealthTier,
}

impl AllocationSummary {
    pub fn of(allocation: Allocation) -> Self {
        let usage_percent = accounting::usage_percent(&allocation);
        Self {
            spent: accounting::spent(&allocation),
            health: classify(usage_percent),
            usage_percent,
            allocation,
        }
    }
}

pub struct BudgetEngine<S> {
    store: S,
}

impl<S: LedgerStore> BudgetEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Reference data ────────────────────────────────────────

    pub fn create_category(&mut self, category: SpendingCategory) -> Result<SpendingCategory> {
        if category.name.trim().is_empty() {
            return Err(LedgerError::validation("name", "must not be empty"));
        }
        let id = self.store.insert_category(&category)?;
        info!(category_id = id, name = %category.name, "category created");
        Ok(SpendingCategory {
            id: Some(id),
            ..category
        })
    }

    pub fn create_vendor(&mut self, vendor: Vendor) -> Result<Vendor> {
        if vendor.name.trim().is_empty() {
            return Err(LedgerError::validation("name", "must not be empty"));
        }
        if vendor.risk_score > 100 {
            return Err(LedgerError::validation(
                "risk_score",
                format!("{} is outside 0-100", vendor.risk_score),
            ));
        }
        let id = self.store.insert_vendor(&vendor)?;
        info!(vendor_id = id, name = %vendor.name, "vendor created");
        Ok(Vendor {
            id: Some(id),
            ..vendor
        })
    }

    /// Vendors by name. A non-blank `query` keeps those whose name or
    /// registration number contains it, ignoring case.
    pub fn vendors(&self, query: Option<&str>) -> Result<Vec<Vendor>> {
        let vendors = self.store.get_vendors()?;
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => Ok(vendors.into_iter().filter(|v| v.matches_search(q)).collect()),
            None => Ok(vendors),
        }
    }

    // ── Allocations ───────────────────────────────────────────

    /// Store a new allocation. It must start with its full amount available
    /// and may only reference existing categories.
    pub fn create_allocation(&mut self, allocation: Allocation) -> Result<Allocation> {
        allocation.validate()?;
        for &id in allocation
            .allowed_categories
            .iter()
            .chain(&allocation.forbidden_categories)
        {
            self.require_category(id)?;
        }
        let id = self.store.insert_allocation(&allocation)?;
        info!(
            allocation_id = id,
            amount = %allocation.amount(),
            "allocation created"
        );
        let mut created = allocation;
        created.id = Some(id);
        Ok(created)
    }

    pub fn allocation(&self, id: i64) -> Result<Allocation> {
        self.store
            .get_allocation(id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Allocation, id))
    }

    pub fn allocation_summary(&self, id: i64) -> Result<AllocationSummary> {
        self.allocation(id).map(AllocationSummary::of)
    }

    /// All allocations, newest first, optionally only those in `health`.
    pub fn allocation_summaries(&self, health: Option<HealthTier>) -> Result<Vec<AllocationSummary>> {
        Ok(self
            .store
            .get_allocations()?
            .into_iter()
            .map(AllocationSummary::of)
            .filter(|s| health.map_or(true, |h| s.health == h))
            .collect())
    }

    /// Whether `category_id` may be charged to `allocation_id`, including
    /// the restricted-category rule.
    pub fn check_category(&self, allocation_id: i64, category_id: i64) -> Result<bool> {
        let allocation = self.allocation(allocation_id)?;
        let category = self.require_category(category_id)?;
        Ok(policy::permits(&allocation, &category))
    }

    // ── Transactions ──────────────────────────────────────────

    /// Record a transaction as handed over by the payment pipeline. The
    /// category policy is not applied here; a violation surfaces when the
    /// transaction is approved.
    pub fn create_transaction(&mut self, txn: Transaction) -> Result<Transaction> {
        if txn.amount <= Decimal::ZERO {
            return Err(LedgerError::validation(
                "amount",
                format!("{} must be greater than zero", txn.amount),
            ));
        }
        if txn.amount > MAX_AMOUNT {
            return Err(LedgerError::validation(
                "amount",
                format!("{} exceeds the maximum of {MAX_AMOUNT}", txn.amount),
            ));
        }
        if txn.risk_score > 100 {
            return Err(LedgerError::validation(
                "risk_score",
                format!("{} is outside 0-100", txn.risk_score),
            ));
        }
        if !txn.status.is_initial() {
            return Err(LedgerError::validation(
                "status",
                format!("a new transaction cannot start as {}", txn.status),
            ));
        }
        let has_reason = txn
            .status_reason
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if txn.status == TransactionStatus::Blocked && !has_reason {
            return Err(LedgerError::validation(
                "status_reason",
                "a blocked transaction needs a reason",
            ));
        }

        self.allocation(txn.allocation_id)?;
        if let Some(id) = txn.category_id {
            self.require_category(id)?;
        }
        if let Some(id) = txn.vendor_id {
            self.store
                .get_vendor(id)?
                .ok_or_else(|| LedgerError::not_found(Entity::Vendor, id))?;
        }

        let id = self.store.insert_transaction(&txn)?;
        info!(
            transaction_id = id,
            allocation_id = txn.allocation_id,
            amount = %txn.amount,
            status = %txn.status,
            "transaction created"
        );
        Ok(Transaction {
            id: Some(id),
            ..txn
        })
    }

    pub fn transaction(&self, id: i64) -> Result<Transaction> {
        self.store
            .get_transaction(id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Transaction, id))
    }

    pub fn transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        self.store.get_transactions(filter)
    }

    pub fn approvals(&self, transaction_id: i64) -> Result<Vec<Approval>> {
        self.store.get_approvals(transaction_id)
    }

    /// Approve a pending or flagged transaction and debit its allocation in
    /// one atomic step.
    ///
    /// When the category policy, the vendor blacklist or the balance refuses
    /// the approval, the transaction keeps its status and the refusal is
    /// written to its `status_reason`. The refusal is returned even if that
    /// write fails.
    pub fn approve(&mut self, transaction_id: i64, approver: &str) -> Result<Transaction> {
        let approver = require_approver(approver)?;
        let result = self.store.commit_transition(transaction_id, |input| {
            lifecycle::approve(
                &input.transaction,
                &input.allocation,
                input.category.as_ref(),
                input.vendor.as_ref(),
                approver,
            )
        });

        match result {
            Ok(transition) => {
                info!(
                    transaction_id,
                    approver,
                    debited = %transition.debited(),
                    "transaction approved"
                );
                Ok(transition.transaction)
            }
            Err(err) if err.is_policy_refusal() => {
                warn!(transaction_id, approver, error = %err, "approval refused");
                if let Err(record_err) = self.record_refusal(transaction_id, &err) {
                    warn!(
                        transaction_id,
                        error = %record_err,
                        "could not record refusal reason"
                    );
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Reject a pending or flagged transaction. The ledger is not touched.
    pub fn reject(
        &mut self,
        transaction_id: i64,
        reason: &str,
        approver: &str,
    ) -> Result<Transaction> {
        let approver = require_approver(approver)?;
        let transition = self.store.commit_transition(transaction_id, |input| {
            lifecycle::reject(&input.transaction, reason, approver)
        })?;
        info!(transaction_id, approver, "transaction rejected");
        Ok(transition.transaction)
    }

    fn record_refusal(&mut self, transaction_id: i64, err: &LedgerError) -> Result<()> {
        let Some(txn) = self.store.get_transaction(transaction_id)? else {
            return Ok(());
        };
        if !txn.is_pending_review() {
            return Ok(());
        }
        // Conditional on the status just read; a concurrent decision wins.
        let written = self
            .store
            .annotate_transaction(transaction_id, txn.status, &err.to_string())?;
        if !written {
            debug!(transaction_id, "status changed before refusal was recorded");
        }
        Ok(())
    }

    // ── Alerts ────────────────────────────────────────────────

    pub fn record_alert(&mut self, alert: FraudAlert) -> Result<FraudAlert> {
        if let Some(id) = alert.transaction_id {
            self.transaction(id)?;
        }
        let id = self.store.insert_alert(&alert)?;
        info!(
            alert_id = id,
            rule = %alert.rule_code,
            severity = %alert.severity,
            "fraud alert recorded"
        );
        Ok(FraudAlert {
            id: Some(id),
            ..alert
        })
    }

    pub fn alerts(&self, status: Option<AlertStatus>) -> Result<Vec<FraudAlert>> {
        self.store.get_alerts(status)
    }

    pub fn set_alert_status(&mut self, id: i64, status: AlertStatus) -> Result<()> {
        self.store.update_alert_status(id, status)?;
        info!(alert_id = id, %status, "alert status changed");
        Ok(())
    }

    // ── Dashboard ─────────────────────────────────────────────

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats> {
        let allocations = self.store.get_allocations()?;
        let transactions = self.store.get_transactions(&TransactionFilter::default())?;
        let alerts = self.store.get_alerts(None)?;
        Ok(DashboardStats::compute(
            &allocations,
            &transactions,
            &alerts,
            today,
        ))
    }

    fn require_category(&self, id: i64) -> Result<SpendingCategory> {
        self.store
            .get_category(id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Category, id))
    }
}

fn require_approver(approver: &str) -> Result<&str> {
    let approver = approver.trim();
    if approver.is_empty() {
        return Err(LedgerError::validation("approver", "must not be empty"));
    }
    Ok(approver)
}
