use crate::models::TransactionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// The transaction status this decision moves to.
    pub fn target_status(&self) -> TransactionStatus {
        match self {
            Self::Approved => TransactionStatus::Approved,
            Self::Rejected => TransactionStatus::Rejected,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit record of one officer decision, written together with the
/// status change it caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub id: Option<i64>,
    pub transaction_id: i64,
    pub approver: String,
    pub decision: Decision,
    pub comments: Option<String>,
    pub decided_at: String,
}

impl Approval {
    pub fn new(transaction_id: i64, approver: String, decision: Decision) -> Self {
        Self {
            id: None,
            transaction_id,
            approver,
            decision,
            comments: None,
            decided_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
