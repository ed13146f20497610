#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Open,
    Investigating,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "investigating" => Some(Self::Investigating),
            "resolved" => Some(Self::Resolved),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }

    /// Open and investigating alerts still need attention.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Investigating)
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised by the external fraud engine; this crate only lists them and
/// tracks their review status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FraudAlert {
    pub id: Option<i64>,
    pub transaction_id: Option<i64>,
    /// e.g. "SPLIT_TRANSACTION", "CATEGORY_VIOLATION"
    pub rule_code: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub explanation: String,
    pub status: AlertStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl FraudAlert {
    pub fn new(rule_code: String, severity: AlertSeverity, title: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            transaction_id: None,
            rule_code,
            severity,
            title,
            explanation: String::new(),
            status: AlertStatus::Open,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
