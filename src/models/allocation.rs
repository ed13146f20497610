use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};

/// Largest amount a single allocation or transaction may carry: one
/// quadrillion. Keeps ledger sums far from `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// A pool of money granted from a `source` to an organization.
///
/// `amount` and `remaining_amount` are private: the only way to lower the
/// balance is `ledger::accounting::debit`, and a stored row can only be
/// brought back through [`Allocation::restore`], which re-checks
/// `0 <= remaining_amount <= amount`.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub id: Option<i64>,
    pub source: String,
    pub organization: String,
    pub department: Option<String>,
    pub project: Option<String>,
    amount: Decimal,
    remaining_amount: Decimal,
    pub currency: String,
    pub allowed_categories: BTreeSet<i64>,
    pub forbidden_categories: BTreeSet<i64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Allocation {
    /// A fresh grant; the whole amount is still available.
    pub fn new(source: String, organization: String, amount: Decimal, start_date: NaiveDate) -> Self {
        Self {
            id: None,
            source,
            organization,
            department: None,
            project: None,
            amount,
            remaining_amount: amount,
            currency: "NAD".to_string(),
            allowed_categories: BTreeSet::new(),
            forbidden_categories: BTreeSet::new(),
            start_date,
            end_date: None,
            notes: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_categories(
        mut self,
        allowed: impl IntoIterator<Item = i64>,
        forbidden: impl IntoIterator<Item = i64>,
    ) -> Self {
        self.allowed_categories = allowed.into_iter().collect();
        self.forbidden_categories = forbidden.into_iter().collect();
        self
    }

    /// Rebuild an allocation read back from a store.
    pub fn restore(mut self, remaining_amount: Decimal) -> Result<Self> {
        if remaining_amount < Decimal::ZERO || remaining_amount > self.amount {
            return Err(LedgerError::Corrupt {
                column: "remaining_amount",
                value: remaining_amount.to_string(),
            });
        }
        self.remaining_amount = remaining_amount;
        Ok(self)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn remaining_amount(&self) -> Decimal {
        self.remaining_amount
    }

    pub(crate) fn with_remaining(&self, remaining_amount: Decimal) -> Self {
        Self {
            remaining_amount,
            ..self.clone()
        }
    }

    /// Validate the fields a caller controls at creation time.
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(LedgerError::validation("amount", "must not be negative"));
        }
        if self.amount > MAX_AMOUNT {
            return Err(LedgerError::validation(
                "amount",
                format!("{} exceeds the maximum of {MAX_AMOUNT}", self.amount),
            ));
        }
        if self.remaining_amount != self.amount {
            return Err(LedgerError::validation(
                "remaining_amount",
                "a new allocation starts with its full amount",
            ));
        }
        if self.source.trim().is_empty() {
            return Err(LedgerError::validation("source", "must not be empty"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(LedgerError::validation(
                    "end_date",
                    format!("{end} is before start date {}", self.start_date),
                ));
            }
        }
        Ok(())
    }

    /// Human-readable label: "source → organization / department".
    pub fn label(&self) -> String {
        match &self.department {
            Some(dept) => format!("{} → {} / {dept}", self.source, self.organization),
            None => format!("{} → {}", self.source, self.organization),
        }
    }
}
