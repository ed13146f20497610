#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vendor {
    pub id: Option<i64>,
    pub name: String,
    pub registration_number: Option<String>,
    pub tax_reference: Option<String>,
    pub bank_account_hash: Option<String>,
    /// Computed by the external risk engine, 0-100.
    pub risk_score: u8,
    pub is_blacklisted: bool,
    pub blacklist_reason: Option<String>,
    pub created_at: String,
}

impl Vendor {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            registration_number: None,
            tax_reference: None,
            bank_account_hash: None,
            risk_score: 0,
            is_blacklisted: false,
            blacklist_reason: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_tax_registered(&self) -> bool {
        self.tax_reference.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Case-insensitive substring match on name or registration number.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .registration_number
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains(&query))
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
