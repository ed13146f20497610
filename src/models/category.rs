#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendingCategory {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    /// Restricted categories are only spendable where an allocation
    /// explicitly allow-lists them.
    pub is_restricted: bool,
}

impl SpendingCategory {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            description: String::new(),
            is_restricted: false,
        }
    }

    pub fn restricted(name: String) -> Self {
        Self {
            is_restricted: true,
            ..Self::new(name)
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(
        categories: &'a [SpendingCategory],
        name: &str,
    ) -> Option<&'a SpendingCategory> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a category by ID in a slice.
    pub fn find_by_id(categories: &[SpendingCategory], id: i64) -> Option<&SpendingCategory> {
        categories.iter().find(|c| c.id == Some(id))
    }
}

impl std::fmt::Display for SpendingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
