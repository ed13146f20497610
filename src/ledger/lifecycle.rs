//! Transaction Lifecycle.
//!
//! ```text
//! pending ──┬──> approved   (category check + debit)
//!           └──> rejected   (reason required)
//! flagged ──┬──> approved
//!           └──> rejected
//! approved, rejected, blocked: terminal
//! ```
//!
//! These functions only compute the next values. Persisting them as one
//! atomic unit is the job of `LedgerStore::commit_transition`.

use rust_decimal::Decimal;

use crate::error::{Entity, LedgerError, Result};
use crate::ledger::{accounting, policy};
use crate::models::{
    Allocation, Approval, Decision, SpendingCategory, Transaction, TransactionStatus, Vendor,
};

/// The values a decided transition writes back.
#[derive(Debug, Clone)]
pub struct Transition {
    pub transaction: Transaction,
    /// Present only when the allocation was debited.
    pub allocation: Option<Allocation>,
    pub approval: Approval,
}

impl Transition {
    pub fn debited(&self) -> Decimal {
        if self.allocation.is_some() {
            self.transaction.amount
        } else {
            Decimal::ZERO
        }
    }
}

fn ensure_transition(transaction: &Transaction, to: TransactionStatus) -> Result<()> {
    if transaction.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(LedgerError::InvalidTransition {
            transaction_id: transaction.id.unwrap_or_default(),
            from: transaction.status,
            to,
        })
    }
}

/// `pending|flagged -> approved`.
///
/// Checks run in order: lifecycle state, vendor blacklist, category policy,
/// then the debit. The first failure is returned and nothing is debited.
pub fn approve(
    transaction: &Transaction,
    allocation: &Allocation,
    category: Option<&SpendingCategory>,
    vendor: Option<&Vendor>,
    approver: &str,
) -> Result<Transition> {
    let decision = Decision::Approved;
    ensure_transition(transaction, decision.target_status())?;

    if allocation.id != Some(transaction.allocation_id) {
        return Err(LedgerError::not_found(
            Entity::Allocation,
            transaction.allocation_id,
        ));
    }

    if let Some(v) = vendor.filter(|v| v.is_blacklisted) {
        return Err(LedgerError::VendorBlacklisted {
            vendor_id: v.id.unwrap_or_default(),
        });
    }

    policy::check_category(allocation, transaction.category_id, category)?;
    let debited = accounting::debit(allocation, transaction.amount)?;

    let txn_id = transaction.id.unwrap_or_default();
    Ok(Transition {
        transaction: transaction.with_status(decision.target_status(), None),
        allocation: Some(debited),
        approval: Approval::new(txn_id, approver.to_string(), decision),
    })
}

/// `pending|flagged -> rejected`. Never touches the ledger.
pub fn reject(transaction: &Transaction, reason: &str, approver: &str) -> Result<Transition> {
    let decision = Decision::Rejected;
    ensure_transition(transaction, decision.target_status())?;

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(LedgerError::validation(
            "status_reason",
            "a rejection needs a reason",
        ));
    }

    let txn_id = transaction.id.unwrap_or_default();
    let mut approval = Approval::new(txn_id, approver.to_string(), decision);
    approval.comments = Some(reason.to_string());
    Ok(Transition {
        transaction: transaction.with_status(decision.target_status(), Some(reason.to_string())),
        allocation: None,
        approval,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
