//! Budget ledger engine for public-fund allocations: category policy,
//! non-negative debits, health classification and an approval lifecycle
//! that debits exactly once, over a pluggable store (in-memory or SQLite).

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod stats;
pub mod store;
pub mod util;

pub use db::Database;
pub use engine::{AllocationSummary, BudgetEngine};
pub use error::{LedgerError, Result};
pub use stats::DashboardStats;
pub use store::{LedgerStore, MemoryStore, TransactionFilter};
