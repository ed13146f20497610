pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS spending_categories (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE COLLATE NOCASE,
    description   TEXT NOT NULL DEFAULT '',
    is_restricted BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS vendors (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    registration_number TEXT,
    tax_reference       TEXT,
    bank_account_hash   TEXT,
    risk_score          INTEGER NOT NULL DEFAULT 0 CHECK (risk_score BETWEEN 0 AND 100),
    is_blacklisted      BOOLEAN NOT NULL DEFAULT 0,
    blacklist_reason    TEXT,
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS fund_allocations (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    source               TEXT NOT NULL,
    organization         TEXT NOT NULL,
    department           TEXT,
    project              TEXT,
    amount               TEXT NOT NULL,
    remaining_amount     TEXT NOT NULL,
    currency             TEXT NOT NULL DEFAULT 'NAD',
    allowed_categories   TEXT NOT NULL DEFAULT '[]',
    forbidden_categories TEXT NOT NULL DEFAULT '[]',
    health               TEXT NOT NULL DEFAULT 'healthy',
    start_date           TEXT NOT NULL,
    end_date             TEXT,
    notes                TEXT,
    created_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_allocations_health ON fund_allocations(health);

CREATE TABLE IF NOT EXISTS transactions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    allocation_id    INTEGER NOT NULL REFERENCES fund_allocations(id),
    vendor_id        INTEGER REFERENCES vendors(id),
    category_id      INTEGER REFERENCES spending_categories(id),
    initiated_by     TEXT NOT NULL DEFAULT '',
    description      TEXT NOT NULL DEFAULT '',
    reference_number TEXT,
    amount           TEXT NOT NULL,
    risk_score       INTEGER NOT NULL DEFAULT 0 CHECK (risk_score BETWEEN 0 AND 100),
    status           TEXT NOT NULL DEFAULT 'pending'
                     CHECK (status IN ('pending', 'flagged', 'blocked', 'approved', 'rejected')),
    status_reason    TEXT,
    transaction_date TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_allocation ON transactions(allocation_id);
CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status);
CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);

CREATE TABLE IF NOT EXISTS approvals (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    transaction_id INTEGER NOT NULL REFERENCES transactions(id),
    approver       TEXT NOT NULL,
    decision       TEXT NOT NULL CHECK (decision IN ('approved', 'rejected')),
    comments       TEXT,
    decided_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_approvals_transaction ON approvals(transaction_id);

CREATE TABLE IF NOT EXISTS fraud_alerts (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    transaction_id INTEGER REFERENCES transactions(id),
    rule_code      TEXT NOT NULL,
    severity       TEXT NOT NULL,
    title          TEXT NOT NULL,
    explanation    TEXT NOT NULL DEFAULT '',
    status         TEXT NOT NULL DEFAULT 'open',
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_alerts_status ON fraud_alerts(status);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
