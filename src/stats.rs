//! Dashboard figures, computed from already-loaded records.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{AlertSeverity, Allocation, FraudAlert, Transaction, TransactionStatus};

/// Money totals saturate at `Decimal::MAX` rather than overflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_allocated: Decimal,
    pub total_remaining: Decimal,
    pub allocation_count: usize,
    pub today_transactions: usize,
    pub today_amount: Decimal,
    pub pending_count: usize,
    /// Open or investigating.
    pub active_alerts: usize,
    pub critical_alerts: usize,
    pub high_alerts: usize,
    /// Rejected, flagged or blocked.
    pub blocked_count: usize,
    pub blocked_amount: Decimal,
}

impl DashboardStats {
    pub fn compute(
        allocations: &[Allocation],
        transactions: &[Transaction],
        alerts: &[FraudAlert],
        today: NaiveDate,
    ) -> Self {
        let mut stats = Self {
            allocation_count: allocations.len(),
            ..Self::default()
        };

        for alloc in allocations {
            stats.total_allocated = stats.total_allocated.saturating_add(alloc.amount());
            stats.total_remaining = stats.total_remaining.saturating_add(alloc.remaining_amount());
        }

        for txn in transactions {
            if txn.transaction_date == today {
                stats.today_transactions += 1;
                stats.today_amount = stats.today_amount.saturating_add(txn.amount);
            }
            if txn.status == TransactionStatus::Pending {
                stats.pending_count += 1;
            }
            if txn.is_blocked_spend() {
                stats.blocked_count += 1;
                stats.blocked_amount = stats.blocked_amount.saturating_add(txn.amount);
            }
        }

        for alert in alerts {
            if alert.status.is_active() {
                stats.active_alerts += 1;
            }
            match alert.severity {
                AlertSeverity::Critical => stats.critical_alerts += 1,
                AlertSeverity::High => stats.high_alerts += 1,
                _ => {}
            }
        }

        stats
    }

    pub fn total_spent(&self) -> Decimal {
        self.total_allocated.saturating_sub(self.total_remaining)
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
