//! Category Policy: which spending categories an allocation may fund.
//!
//! Precedence, strongest first:
//! 1. a forbidden category is refused, even if it is also allow-listed;
//! 2. a non-empty allow-list permits only its members;
//! 3. an empty allow-list permits everything not forbidden.
//!
//! Restricted categories additionally need an explicit allow-list entry.

use crate::error::{LedgerError, Result};
use crate::models::{Allocation, SpendingCategory};

pub fn is_category_permitted(allocation: &Allocation, category_id: i64) -> bool {
    if allocation.forbidden_categories.contains(&category_id) {
        return false;
    }
    if !allocation.allowed_categories.is_empty() {
        return allocation.allowed_categories.contains(&category_id);
    }
    true
}

/// Like [`is_category_permitted`], but also enforces `is_restricted`.
pub fn permits(allocation: &Allocation, category: &SpendingCategory) -> bool {
    let Some(id) = category.id else {
        return false;
    };
    if !is_category_permitted(allocation, id) {
        return false;
    }
    !category.is_restricted || allocation.allowed_categories.contains(&id)
}

/// An uncategorized transaction can only draw on an unrestricted allocation.
pub fn permits_uncategorized(allocation: &Allocation) -> bool {
    allocation.allowed_categories.is_empty()
}

/// Fails with `CategoryViolation` when the category may not be charged.
///
/// `category` is the looked-up record for `category_id` when the caller has
/// it; without it only the allow/forbid lists are consulted.
pub fn check_category(
    allocation: &Allocation,
    category_id: Option<i64>,
    category: Option<&SpendingCategory>,
) -> Result<()> {
    let permitted = match (category_id, category) {
        (None, _) => permits_uncategorized(allocation),
        (Some(_), Some(cat)) => permits(allocation, cat),
        (Some(id), None) => is_category_permitted(allocation, id),
    };
    if permitted {
        Ok(())
    } else {
        Err(LedgerError::CategoryViolation {
            allocation_id: allocation.id.unwrap_or_default(),
            category_id,
        })
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
