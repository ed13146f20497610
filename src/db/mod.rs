mod schema;

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{Entity, LedgerError, Result};
use crate::ledger::{classify, usage_percent, HealthTier, Transition};
use crate::models::*;
use crate::store::{LedgerStore, TransactionFilter, TransitionInput};

const DATE_FORMAT: &str = "%Y-%m-%d";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CATEGORY_COLUMNS: &str = "id, name, description, is_restricted";
const VENDOR_COLUMNS: &str = "id, name, registration_number, tax_reference, bank_account_hash,
     risk_score, is_blacklisted, blacklist_reason, created_at";
const ALLOCATION_COLUMNS: &str = "id, source, organization, department, project, amount,
     remaining_amount, currency, allowed_categories, forbidden_categories, start_date,
     end_date, notes, created_at";
const TRANSACTION_COLUMNS: &str = "id, allocation_id, vendor_id, category_id, initiated_by,
     description, reference_number, amount, risk_score, status, status_reason,
     transaction_date, created_at, updated_at";
const APPROVAL_COLUMNS: &str = "id, transaction_id, approver, decision, comments, decided_at";
const ALERT_COLUMNS: &str = "id, transaction_id, rule_code, severity, title, explanation,
     status, created_at, updated_at";

/// SQLite-backed ledger. Each `Database` owns one connection; several may
/// point at the same file, and approvals stay serialized across them.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening ledger database");
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            info!(version = schema::CURRENT_VERSION, "creating ledger schema");
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        let tx = self.conn.transaction()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                debug!(from_version, "applying migration");
                tx.execute_batch(sql)?;
            }
        }
        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM spending_categories", [], |row| {
                    row.get(0)
                })?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            ("Books", false),
            ("Construction", false),
            ("Consulting", false),
            ("Entertainment", true),
            ("Equipment", false),
            ("Events", false),
            ("Gifts & Hospitality", true),
            ("Maintenance", false),
            ("Materials", false),
            ("Medical Equipment", false),
            ("Services", false),
            ("Supplies", false),
            ("Technology", false),
            ("Training", false),
            ("Travel", false),
        ];

        let tx = self.conn.transaction()?;
        for (name, restricted) in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO spending_categories (name, description, is_restricted)
                 VALUES (?1, '', ?2)",
                params![name, restricted],
            )?;
        }
        tx.commit()?;
        debug!(count = defaults.len(), "seeded default spending categories");
        Ok(())
    }

    /// Allocations whose stored health tier matches. The tier is written
    /// together with every balance change, so this is a plain index lookup.
    pub fn get_allocations_by_health(&self, health: HealthTier) -> Result<Vec<Allocation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ALLOCATION_COLUMNS} FROM fund_allocations WHERE health = ?1 ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map(params![health.as_str()], allocation_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl LedgerStore for Database {
    // ── Categories ────────────────────────────────────────────

    fn insert_category(&mut self, category: &SpendingCategory) -> Result<i64> {
        let result = self.conn.execute(
            "INSERT INTO spending_categories (name, description, is_restricted) VALUES (?1, ?2, ?3)",
            params![category.name, category.description, category.is_restricted],
        );
        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(LedgerError::validation(
                    "name",
                    format!("category '{}' already exists", category.name),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_category(&self, id: i64) -> Result<Option<SpendingCategory>> {
        query_category(&self.conn, id)
    }

    fn get_categories(&self) -> Result<Vec<SpendingCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM spending_categories ORDER BY name"
        ))?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Vendors ───────────────────────────────────────────────

    fn insert_vendor(&mut self, vendor: &Vendor) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO vendors (name, registration_number, tax_reference, bank_account_hash,
                                  risk_score, is_blacklisted, blacklist_reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                vendor.name,
                vendor.registration_number,
                vendor.tax_reference,
                vendor.bank_account_hash,
                vendor.risk_score,
                vendor.is_blacklisted,
                vendor.blacklist_reason,
                vendor.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_vendor(&self, id: i64) -> Result<Option<Vendor>> {
        query_vendor(&self.conn, id)
    }

    fn get_vendors(&self) -> Result<Vec<Vendor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY name"))?;
        let rows = stmt.query_map([], vendor_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Allocations ───────────────────────────────────────────

    fn insert_allocation(&mut self, allocation: &Allocation) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO fund_allocations (source, organization, department, project, amount,
                                           remaining_amount, currency, allowed_categories,
                                           forbidden_categories, health, start_date, end_date,
                                           notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                allocation.source,
                allocation.organization,
                allocation.department,
                allocation.project,
                allocation.amount().to_string(),
                allocation.remaining_amount().to_string(),
                allocation.currency,
                id_set_to_json(&allocation.allowed_categories),
                id_set_to_json(&allocation.forbidden_categories),
                classify(usage_percent(allocation)).as_str(),
                allocation.start_date.format(DATE_FORMAT).to_string(),
                allocation
                    .end_date
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                allocation.notes,
                allocation.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_allocation(&self, id: i64) -> Result<Option<Allocation>> {
        query_allocation(&self.conn, id)
    }

    fn get_allocations(&self) -> Result<Vec<Allocation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ALLOCATION_COLUMNS} FROM fund_allocations ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map([], allocation_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Transactions ──────────────────────────────────────────

    fn insert_transaction(&mut self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (allocation_id, vendor_id, category_id, initiated_by,
                                       description, reference_number, amount, risk_score,
                                       status, status_reason, transaction_date, created_at,
                                       updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                txn.allocation_id,
                txn.vendor_id,
                txn.category_id,
                txn.initiated_by,
                txn.description,
                txn.reference_number,
                txn.amount.to_string(),
                txn.risk_score,
                txn.status.as_str(),
                txn.status_reason,
                txn.transaction_date.format(DATE_FORMAT).to_string(),
                txn.created_at,
                txn.updated_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        query_transaction(&self.conn, id)
    }

    fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(aid) = filter.allocation_id {
            sql.push_str(&format!(" AND allocation_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(aid));
        }
        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.as_str()));
        }

        sql.push_str(" ORDER BY transaction_date DESC, id DESC");

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn annotate_transaction(
        &mut self,
        id: i64,
        expected: TransactionStatus,
        reason: &str,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE transactions SET status_reason = ?1, updated_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![reason, chrono::Utc::now().to_rfc3339(), id, expected.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn commit_transition<F>(&mut self, transaction_id: i64, decide: F) -> Result<Transition>
    where
        F: FnOnce(&TransitionInput) -> Result<Transition>,
    {
        // IMMEDIATE takes the write lock up front, so a second connection
        // blocks here (up to the busy timeout) instead of reading stale rows.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let transaction = query_transaction(&tx, transaction_id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Transaction, transaction_id))?;
        let allocation = query_allocation(&tx, transaction.allocation_id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Allocation, transaction.allocation_id))?;
        let category = match transaction.category_id {
            Some(id) => query_category(&tx, id)?,
            None => None,
        };
        let vendor = match transaction.vendor_id {
            Some(id) => query_vendor(&tx, id)?,
            None => None,
        };

        let input = TransitionInput {
            transaction,
            allocation,
            category,
            vendor,
        };
        // Dropping `tx` on any early return rolls back.
        let mut transition = decide(&input)?;

        let changed = tx.execute(
            "UPDATE transactions SET status = ?1, status_reason = ?2, updated_at = ?3
             WHERE id = ?4 AND status = ?5",
            params![
                transition.transaction.status.as_str(),
                transition.transaction.status_reason,
                transition.transaction.updated_at,
                transaction_id,
                input.transaction.status.as_str(),
            ],
        )?;
        if changed == 0 {
            let current = query_transaction(&tx, transaction_id)?.map(|t| t.status);
            return Err(LedgerError::InvalidTransition {
                transaction_id,
                from: current.unwrap_or(input.transaction.status),
                to: transition.transaction.status,
            });
        }

        if let Some(debited) = &transition.allocation {
            let allocation_id = input.allocation.id.unwrap_or_default();
            let seen = input.allocation.remaining_amount();
            if debited.remaining_amount() + transition.debited() != seen {
                return Err(LedgerError::Conflict { allocation_id });
            }
            let changed = tx.execute(
                "UPDATE fund_allocations SET remaining_amount = ?1, health = ?2
                 WHERE id = ?3 AND remaining_amount = ?4",
                params![
                    debited.remaining_amount().to_string(),
                    classify(usage_percent(debited)).as_str(),
                    allocation_id,
                    seen.to_string(),
                ],
            )?;
            if changed == 0 {
                return Err(LedgerError::Conflict { allocation_id });
            }
        }

        let approval = &transition.approval;
        tx.execute(
            "INSERT INTO approvals (transaction_id, approver, decision, comments, decided_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                approval.transaction_id,
                approval.approver,
                approval.decision.as_str(),
                approval.comments,
                approval.decided_at,
            ],
        )?;
        transition.approval.id = Some(tx.last_insert_rowid());

        tx.commit()?;
        debug!(
            transaction_id,
            status = %transition.transaction.status,
            debited = %transition.debited(),
            "transition committed"
        );
        Ok(transition)
    }

    fn get_approvals(&self, transaction_id: i64) -> Result<Vec<Approval>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {APPROVAL_COLUMNS} FROM approvals WHERE transaction_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![transaction_id], |row| {
            Ok(Approval {
                id: Some(row.get(0)?),
                transaction_id: row.get(1)?,
                approver: row.get(2)?,
                decision: get_parsed(row, 3, "decision", Decision::parse)?,
                comments: row.get(4)?,
                decided_at: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Alerts ────────────────────────────────────────────────

    fn insert_alert(&mut self, alert: &FraudAlert) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO fraud_alerts (transaction_id, rule_code, severity, title, explanation,
                                       status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                alert.transaction_id,
                alert.rule_code,
                alert.severity.as_str(),
                alert.title,
                alert.explanation,
                alert.status.as_str(),
                alert.created_at,
                alert.updated_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<FraudAlert>> {
        let mut sql = format!("SELECT {ALERT_COLUMNS} FROM fraud_alerts");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(s) = status {
            sql.push_str(" WHERE status = ?1");
            param_values.push(Box::new(s.as_str()));
        }
        sql.push_str(" ORDER BY id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), alert_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn update_alert_status(&mut self, id: i64, status: AlertStatus) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE fraud_alerts SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), chrono::Utc::now().to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(Entity::Alert, id));
        }
        Ok(())
    }
}

// ── Single-row lookups (shared with `commit_transition`) ──────

fn query_category(conn: &Connection, id: i64) -> Result<Option<SpendingCategory>> {
    Ok(conn
        .query_row(
            &format!("SELECT {CATEGORY_COLUMNS} FROM spending_categories WHERE id = ?1"),
            params![id],
            category_from_row,
        )
        .optional()?)
}

fn query_vendor(conn: &Connection, id: i64) -> Result<Option<Vendor>> {
    Ok(conn
        .query_row(
            &format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = ?1"),
            params![id],
            vendor_from_row,
        )
        .optional()?)
}

fn query_allocation(conn: &Connection, id: i64) -> Result<Option<Allocation>> {
    Ok(conn
        .query_row(
            &format!("SELECT {ALLOCATION_COLUMNS} FROM fund_allocations WHERE id = ?1"),
            params![id],
            allocation_from_row,
        )
        .optional()?)
}

fn query_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    Ok(conn
        .query_row(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"),
            params![id],
            transaction_from_row,
        )
        .optional()?)
}

// ── Row mapping ───────────────────────────────────────────────

fn category_from_row(row: &Row) -> rusqlite::Result<SpendingCategory> {
    Ok(SpendingCategory {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        is_restricted: row.get(3)?,
    })
}

fn vendor_from_row(row: &Row) -> rusqlite::Result<Vendor> {
    Ok(Vendor {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        registration_number: row.get(2)?,
        tax_reference: row.get(3)?,
        bank_account_hash: row.get(4)?,
        risk_score: row.get(5)?,
        is_blacklisted: row.get(6)?,
        blacklist_reason: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn allocation_from_row(row: &Row) -> rusqlite::Result<Allocation> {
    let mut allocation = Allocation::new(
        row.get(1)?,
        row.get(2)?,
        get_decimal(row, 5)?,
        get_date(row, 10)?,
    )
    .with_categories(get_id_set(row, 8)?, get_id_set(row, 9)?);
    allocation.id = Some(row.get(0)?);
    allocation.department = row.get(3)?;
    allocation.project = row.get(4)?;
    allocation.currency = row.get(7)?;
    allocation.end_date = match row.get::<_, Option<String>>(11)? {
        Some(s) => Some(parse_date(11, &s)?),
        None => None,
    };
    allocation.notes = row.get(12)?;
    allocation.created_at = row.get(13)?;
    allocation
        .restore(get_decimal(row, 6)?)
        .map_err(|e| conversion_error(6, e))
}

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: Some(row.get(0)?),
        allocation_id: row.get(1)?,
        vendor_id: row.get(2)?,
        category_id: row.get(3)?,
        initiated_by: row.get(4)?,
        description: row.get(5)?,
        reference_number: row.get(6)?,
        amount: get_decimal(row, 7)?,
        risk_score: row.get(8)?,
        status: get_parsed(row, 9, "status", TransactionStatus::parse)?,
        status_reason: row.get(10)?,
        transaction_date: get_date(row, 11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn alert_from_row(row: &Row) -> rusqlite::Result<FraudAlert> {
    Ok(FraudAlert {
        id: Some(row.get(0)?),
        transaction_id: row.get(1)?,
        rule_code: row.get(2)?,
        severity: get_parsed(row, 3, "severity", AlertSeverity::parse)?,
        title: row.get(4)?,
        explanation: row.get(5)?,
        status: get_parsed(row, 6, "status", AlertStatus::parse)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ── Column codecs ─────────────────────────────────────────────

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_decimal(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str(&s).map_err(|e| conversion_error(idx, e))
}

fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn get_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    parse_date(idx, &s)
}

fn get_id_set(row: &Row, idx: usize) -> rusqlite::Result<BTreeSet<i64>> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s).map_err(|e| conversion_error(idx, e))
}

fn get_parsed<T>(
    row: &Row,
    idx: usize,
    column: &'static str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    parse(&s).ok_or_else(|| conversion_error(idx, LedgerError::Corrupt { column, value: s }))
}

fn id_set_to_json(ids: &BTreeSet<i64>) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}
