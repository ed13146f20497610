mod alert;
mod allocation;
mod approval;
mod category;
mod transaction;
mod vendor;

pub use alert::{AlertSeverity, AlertStatus, FraudAlert};
pub use allocation::{Allocation, MAX_AMOUNT};
pub use approval::{Approval, Decision};
pub use category::SpendingCategory;
pub use transaction::{Transaction, TransactionStatus};
pub use vendor::Vendor;

#[cfg(test)]
mod tests;
