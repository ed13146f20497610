//! Budget ledger rules: category policy, accounting, health status and the
//! transaction lifecycle. Everything here is pure; persistence lives in
//! `store` and `db`.

pub mod accounting;
pub mod lifecycle;
pub mod policy;
pub mod status;

pub use accounting::{debit, spent, usage_percent};
pub use lifecycle::Transition;
pub use policy::is_category_permitted;
pub use status::{classify, HealthTier, RiskLevel};
