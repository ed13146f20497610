//! Status Classifier: usage percentage → health tier, risk score → level.
//!
//! Both are pure and recomputed on every read.

pub const LOW_BALANCE_THRESHOLD: f64 = 80.0;
pub const CRITICAL_THRESHOLD: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthTier {
    Healthy,
    LowBalance,
    Critical,
}

impl HealthTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::LowBalance => "low_balance",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "healthy" => Some(Self::Healthy),
            "low_balance" | "low" => Some(Self::LowBalance),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::LowBalance => "Low Balance",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for HealthTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lower bounds are inclusive: 80 is already low balance, 95 critical.
pub fn classify(usage_percent: f64) -> HealthTier {
    if usage_percent >= CRITICAL_THRESHOLD {
        HealthTier::Critical
    } else if usage_percent >= LOW_BALANCE_THRESHOLD {
        HealthTier::LowBalance
    } else {
        HealthTier::Healthy
    }
}

/// Banding of the externally computed 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => Self::Low,
            31..=60 => Self::Medium,
            61..=80 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium",
            Self::High => "High Risk",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
