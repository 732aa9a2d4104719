//! SQL schema for the Sentinel SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS companies (
    company_id    TEXT PRIMARY KEY,
    company_name  TEXT NOT NULL,
    industry_type TEXT NOT NULL,   -- 'factory' | 'lab' | 'warehouse' | 'construction'
    company_email TEXT NOT NULL,
    reg_no        TEXT NOT NULL,
    admin_name    TEXT NOT NULL,
    admin_email   TEXT NOT NULL,
    contact       TEXT NOT NULL,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    status        TEXT NOT NULL DEFAULT 'pending'
                  CHECK (status IN ('pending', 'active', 'rejected')),
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    decided_at    TEXT,            -- set together with decided_by
    decided_by    TEXT,
    CHECK ((status = 'pending') = (decided_at IS NULL))
);

-- Rejected records never block a fresh application.
CREATE UNIQUE INDEX IF NOT EXISTS companies_company_email_live
    ON companies(lower(company_email)) WHERE status != 'rejected';
CREATE UNIQUE INDEX IF NOT EXISTS companies_admin_email_live
    ON companies(lower(admin_email)) WHERE status != 'rejected';
CREATE UNIQUE INDEX IF NOT EXISTS companies_reg_no_live
    ON companies(reg_no) WHERE status != 'rejected';
CREATE INDEX IF NOT EXISTS companies_status_idx ON companies(status);

-- Strictly append-only.
CREATE TABLE IF NOT EXISTS decisions (
    decision_id TEXT PRIMARY KEY,
    company_id  TEXT NOT NULL REFERENCES companies(company_id),
    decision    TEXT NOT NULL,   -- 'approve' | 'reject'
    actor       TEXT NOT NULL,
    from_status TEXT NOT NULL,
    to_status   TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    UNIQUE (company_id)          -- a company is decided at most once
);

CREATE TABLE IF NOT EXISTS employees (
    company_reg_no    TEXT NOT NULL,
    employee_id       TEXT NOT NULL,
    name              TEXT NOT NULL,
    department        TEXT NOT NULL,
    compliance_status TEXT NOT NULL DEFAULT 'unknown',
    last_violation    TEXT,
    created_at        TEXT NOT NULL,
    PRIMARY KEY (company_reg_no, employee_id)
);

PRAGMA user_version = 1;
";
