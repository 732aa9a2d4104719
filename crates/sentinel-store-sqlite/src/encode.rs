//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enumerations are stored as
//! their snake_case wire names. UUIDs are stored as hyphenated lowercase
//! strings.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sentinel_core::{
  company::{Company, CompanyProfile},
  employee::Employee,
  lifecycle::DecisionRecord,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Enumerations ─────────────────────────────────────────────────────────────

/// Decode any snake_case enumeration column (status, industry, decision, ...).
pub fn decode_enum<T: FromStr>(column: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {column}: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawCompany::from_row`].
pub const COMPANY_COLUMNS: &str = "company_id, company_name, industry_type, company_email, \
   reg_no, admin_name, admin_email, contact, status, created_at, decided_at, decided_by";

/// Raw strings read directly from a `companies` row.
pub struct RawCompany {
  pub company_id:    String,
  pub company_name:  String,
  pub industry_type: String,
  pub company_email: String,
  pub reg_no:        String,
  pub admin_name:    String,
  pub admin_email:   String,
  pub contact:       String,
  pub status:        String,
  pub created_at:    String,
  pub decided_at:    Option<String>,
  pub decided_by:    Option<String>,
}

impl RawCompany {
  /// Read the [`COMPANY_COLUMNS`] starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      company_id:    row.get(0)?,
      company_name:  row.get(1)?,
      industry_type: row.get(2)?,
      company_email: row.get(3)?,
      reg_no:        row.get(4)?,
      admin_name:    row.get(5)?,
      admin_email:   row.get(6)?,
      contact:       row.get(7)?,
      status:        row.get(8)?,
      created_at:    row.get(9)?,
      decided_at:    row.get(10)?,
      decided_by:    row.get(11)?,
    })
  }

  pub fn into_company(self) -> Result<Company> {
    Ok(Company {
      id:         decode_uuid(&self.company_id)?,
      profile:    CompanyProfile {
        company_name:  self.company_name,
        industry_type: decode_enum("industry_type", &self.industry_type)?,
        company_email: self.company_email,
        reg_no:        self.reg_no,
        admin_name:    self.admin_name,
        admin_email:   self.admin_email,
        contact:       self.contact,
      },
      status:     decode_enum("status", &self.status)?,
      created_at: decode_dt(&self.created_at)?,
      decided_at: self.decided_at.as_deref().map(decode_dt).transpose()?,
      decided_by: self.decided_by,
    })
  }
}

/// Raw strings read directly from a `decisions` row.
pub struct RawDecision {
  pub decision_id: String,
  pub company_id:  String,
  pub decision:    String,
  pub actor:       String,
  pub from_status: String,
  pub to_status:   String,
  pub recorded_at: String,
}

impl RawDecision {
  pub fn into_record(self) -> Result<DecisionRecord> {
    Ok(DecisionRecord {
      decision_id: decode_uuid(&self.decision_id)?,
      company_id:  decode_uuid(&self.company_id)?,
      decision:    decode_enum("decision", &self.decision)?,
      actor:       self.actor,
      from:        decode_enum("from_status", &self.from_status)?,
      to:          decode_enum("to_status", &self.to_status)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from an `employees` row.
pub struct RawEmployee {
  pub company_reg_no:    String,
  pub employee_id:       String,
  pub name:              String,
  pub department:        String,
  pub compliance_status: String,
  pub last_violation:    Option<String>,
  pub created_at:        String,
}

impl RawEmployee {
  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      employee_id:       self.employee_id,
      name:              self.name,
      department:        self.department,
      company_reg_no:    self.company_reg_no,
      compliance_status: decode_enum("compliance_status", &self.compliance_status)?,
      last_violation:    self.last_violation.as_deref().map(decode_dt).transpose()?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}
