//! Ledger Accounting: the only path that lowers `remaining_amount`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::models::Allocation;

/// Debit `amount` from the allocation, returning the new value.
///
/// Requires `0 < amount <= remaining_amount`; anything else is
/// `InsufficientFunds` and leaves the input untouched.
pub fn debit(allocation: &Allocation, amount: Decimal) -> Result<Allocation> {
    let remaining = allocation.remaining_amount();
    if amount <= Decimal::ZERO || amount > remaining {
        return Err(LedgerError::InsufficientFunds {
            allocation_id: allocation.id.unwrap_or_default(),
            requested: amount,
            remaining,
        });
    }
    Ok(allocation.with_remaining(remaining - amount))
}

/// Amount consumed so far. Always derived, never stored.
pub fn spent(allocation: &Allocation) -> Decimal {
    allocation.amount() - allocation.remaining_amount()
}

/// Percentage of the grant consumed, `0.0` for an empty grant.
///
/// Not clamped: with the balance invariant held it stays within `[0, 100]`.
/// The ratio is taken before scaling so a grant near `Decimal::MAX` cannot
/// overflow.
pub fn usage_percent(allocation: &Allocation) -> f64 {
    let total = allocation.amount();
    if total.is_zero() {
        return 0.0;
    }
    (spent(allocation) / total * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}

#[cfg(test)]
#[path = "accounting_tests.rs"]
mod tests;
