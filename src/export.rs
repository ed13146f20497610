use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::ledger::RiskLevel;
use crate::models::{Allocation, SpendingCategory, Transaction, Vendor};
use crate::store::{LedgerStore, TransactionFilter};

const HEADER: [&str; 10] = [
    "id",
    "date",
    "allocation",
    "vendor",
    "category",
    "amount",
    "risk_score",
    "risk_level",
    "status",
    "reason",
];

/// Write every transaction in `store` to a CSV file at `path`, newest first.
/// Returns the number of data rows written.
pub fn export_to_csv<S: LedgerStore>(store: &S, path: &Path) -> Result<usize> {
    let transactions = store.get_transactions(&TransactionFilter::default())?;
    let allocations = store.get_allocations()?;
    let vendors = store.get_vendors()?;
    let categories = store.get_categories()?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_transactions(file, &transactions, &allocations, &vendors, &categories)
}

/// Write `transactions` as CSV, resolving ids to display names.
pub fn write_transactions<W: Write>(
    writer: W,
    transactions: &[Transaction],
    allocations: &[Allocation],
    vendors: &[Vendor],
    categories: &[SpendingCategory],
) -> Result<usize> {
    let allocation_labels: HashMap<i64, String> = allocations
        .iter()
        .filter_map(|a| a.id.map(|id| (id, a.label())))
        .collect();
    let vendor_names: HashMap<i64, &str> = vendors
        .iter()
        .filter_map(|v| v.id.map(|id| (id, v.name.as_str())))
        .collect();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)
        .context("Failed to write CSV header")?;

    let mut count = 0;
    for txn in transactions {
        let allocation = allocation_labels
            .get(&txn.allocation_id)
            .cloned()
            .unwrap_or_else(|| txn.allocation_id.to_string());
        let vendor = txn
            .vendor_id
            .and_then(|id| vendor_names.get(&id).copied())
            .unwrap_or("");
        let category = txn
            .category_id
            .and_then(|id| SpendingCategory::find_by_id(categories, id))
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized");

        wtr.write_record([
            txn.id.map(|id| id.to_string()).unwrap_or_default().as_str(),
            txn.transaction_date.format("%Y-%m-%d").to_string().as_str(),
            allocation.as_str(),
            vendor,
            category,
            txn.amount.to_string().as_str(),
            txn.risk_score.to_string().as_str(),
            RiskLevel::from_score(txn.risk_score).label(),
            txn.status.as_str(),
            txn.status_reason.as_deref().unwrap_or(""),
        ])
        .with_context(|| format!("Failed to write transaction {}", txn.id.unwrap_or_default()))?;
        count += 1;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(count)
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
