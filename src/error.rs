//! Error taxonomy for ledger operations.
//!
//! Every variant is recoverable. The `Display` text doubles as the
//! user-facing message and as the `status_reason` recorded on a
//! transaction whose approval was refused.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::TransactionStatus;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Kinds of records the engine looks up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Allocation,
    Transaction,
    Category,
    Vendor,
    Alert,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allocation => "Allocation",
            Self::Transaction => "Transaction",
            Self::Category => "Category",
            Self::Vendor => "Vendor",
            Self::Alert => "Alert",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{} is not permitted for allocation {allocation_id}", describe_category(.category_id))]
    CategoryViolation {
        allocation_id: i64,
        /// `None` for an uncategorized transaction.
        category_id: Option<i64>,
    },

    #[error("Insufficient funds in allocation {allocation_id}: requested {requested}, remaining {remaining}")]
    InsufficientFunds {
        allocation_id: i64,
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Transaction {transaction_id} cannot move from {from} to {to}")]
    InvalidTransition {
        transaction_id: i64,
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("Vendor {vendor_id} is blacklisted")]
    VendorBlacklisted { vendor_id: i64 },

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Allocation {allocation_id} changed while the approval was in progress")]
    Conflict { allocation_id: i64 },

    #[error("Corrupt {column} value in store: {value:?}")]
    Corrupt { column: &'static str, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

fn describe_category(category_id: &Option<i64>) -> String {
    match category_id {
        Some(id) => format!("Category {id}"),
        None => "An uncategorized transaction".to_string(),
    }
}

impl LedgerError {
    pub(crate) fn not_found(entity: Entity, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether a refused approval should be written back as the
    /// transaction's `status_reason`.
    pub fn is_policy_refusal(&self) -> bool {
        matches!(
            self,
            Self::CategoryViolation { .. }
                | Self::InsufficientFunds { .. }
                | Self::VendorBlacklisted { .. }
        )
    }
}
