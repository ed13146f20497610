use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Pending,
    Flagged,
    Blocked,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Flagged => "flagged",
            Self::Blocked => "blocked",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "flagged" => Some(Self::Flagged),
            "blocked" => Some(Self::Blocked),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn all() -> &'static [TransactionStatus] {
        &[
            Self::Pending,
            Self::Flagged,
            Self::Blocked,
            Self::Approved,
            Self::Rejected,
        ]
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Blocked)
    }

    /// Pending and flagged transactions may be approved or rejected;
    /// nothing else moves.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        !self.is_terminal() && matches!(next, Self::Approved | Self::Rejected)
    }

    /// Statuses a transaction may be created in. Flagged and blocked
    /// come from the external risk engine.
    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Pending | Self::Flagged | Self::Blocked)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    /// The funding allocation (its wallet in the hosted schema).
    pub allocation_id: i64,
    pub vendor_id: Option<i64>,
    pub category_id: Option<i64>,
    pub initiated_by: String,
    pub description: String,
    pub reference_number: Option<String>,
    pub amount: Decimal,
    pub risk_score: u8,
    pub status: TransactionStatus,
    pub status_reason: Option<String>,
    pub transaction_date: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn new(
        allocation_id: i64,
        amount: Decimal,
        description: String,
        transaction_date: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            allocation_id,
            vendor_id: None,
            category_id: None,
            initiated_by: String::new(),
            description,
            reference_number: None,
            amount,
            risk_score: 0,
            status: TransactionStatus::Pending,
            status_reason: None,
            transaction_date,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// New value with `status` and `status_reason` replaced.
    pub fn with_status(&self, status: TransactionStatus, reason: Option<String>) -> Self {
        Self {
            status,
            status_reason: reason,
            updated_at: chrono::Utc::now().to_rfc3339(),
            ..self.clone()
        }
    }

    pub fn is_pending_review(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Pending | TransactionStatus::Flagged
        )
    }

    /// Counted as stopped spending on the dashboard.
    pub fn is_blocked_spend(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Rejected | TransactionStatus::Flagged | TransactionStatus::Blocked
        )
    }
}
