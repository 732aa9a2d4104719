//! [`SqliteStore`], the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sentinel_core::{
  company::{Company, CompanyProfile, CompanyStatus},
  employee::{BulkOutcome, Employee, NewEmployee},
  lifecycle::{self, Decision, DecisionRecord},
  store::{AdminCredentials, RegistryStore},
};

use crate::{
  Error, Result,
  encode::{
    COMPANY_COLUMNS, RawCompany, RawDecision, RawEmployee, decode_enum, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// What happened inside the decision transaction.
enum DecideOutcome {
  Applied(RawCompany),
  /// The guarded UPDATE touched nothing; carries the status found instead,
  /// or `None` if the company does not exist.
  Refused(Option<String>),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Sentinel registry backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Companies ─────────────────────────────────────────────────────────────

  async fn register(
    &self,
    profile:       CompanyProfile,
    password_hash: String,
  ) -> Result<Company> {
    let company = Company::pending(profile.trimmed());

    let id_str   = encode_uuid(company.id);
    let at_str   = encode_dt(company.created_at);
    let status   = company.status.as_ref().to_owned();
    let industry = company.profile.industry_type.as_ref().to_owned();
    let p        = company.profile.clone();

    let clash: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let clash: Option<String> = tx
          .query_row(
            "SELECT CASE
               WHEN lower(company_email) = lower(?1) THEN 'company email'
               WHEN lower(admin_email)   = lower(?2) THEN 'admin email'
               ELSE 'registration number'
             END
             FROM companies
             WHERE status != 'rejected'
               AND (lower(company_email) = lower(?1)
                    OR lower(admin_email) = lower(?2)
                    OR reg_no = ?3)
             LIMIT 1",
            rusqlite::params![p.company_email, p.admin_email, p.reg_no],
            |r| r.get(0),
          )
          .optional()?;
        if clash.is_some() {
          return Ok(clash);
        }

        tx.execute(
          "INSERT INTO companies (
             company_id, company_name, industry_type, company_email, reg_no,
             admin_name, admin_email, contact, password_hash, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            p.company_name,
            industry,
            p.company_email,
            p.reg_no,
            p.admin_name,
            p.admin_email,
            p.contact,
            password_hash,
            status,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(None)
      })
      .await?;

    if let Some(field) = clash {
      return Err(
        sentinel_core::Error::Duplicate(format!(
          "a company with this {field} already exists or has applied"
        ))
        .into(),
      );
    }

    Ok(company)
  }

  async fn get_company(&self, id: Uuid) -> Result<Option<Company>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCompany> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE company_id = ?1"),
            rusqlite::params![id_str],
            RawCompany::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCompany::into_company).transpose()
  }

  async fn list_companies(&self, status: Option<CompanyStatus>) -> Result<Vec<Company>> {
    let status_str = status.map(|s| s.as_ref().to_owned());

    let raws: Vec<RawCompany> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE status = ?1 ORDER BY rowid"
          ))?;
          stmt
            .query_map(rusqlite::params![s], RawCompany::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn
            .prepare(&format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY rowid"))?;
          stmt
            .query_map([], RawCompany::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompany::into_company).collect()
  }

  async fn decide(
    &self,
    id:       Uuid,
    decision: Decision,
    actor:    String,
  ) -> Result<(Company, DecisionRecord)> {
    let record = DecisionRecord {
      decision_id: Uuid::new_v4(),
      company_id: id,
      decision,
      actor,
      from: CompanyStatus::Pending,
      to: decision.target(),
      recorded_at: Utc::now(),
    };

    let dec_id_str   = encode_uuid(record.decision_id);
    let id_str       = encode_uuid(id);
    let decision_str = decision.as_ref().to_owned();
    let actor_str    = record.actor.clone();
    let from_str     = record.from.as_ref().to_owned();
    let to_str       = record.to.as_ref().to_owned();
    let at_str       = encode_dt(record.recorded_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Compare-and-swap: only a pending row is eligible.
        let changed = tx.execute(
          "UPDATE companies
           SET status = ?2, decided_at = ?3, decided_by = ?4
           WHERE company_id = ?1 AND status = 'pending'",
          rusqlite::params![id_str, to_str, at_str, actor_str],
        )?;

        if changed == 0 {
          let current: Option<String> = tx
            .query_row(
              "SELECT status FROM companies WHERE company_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?;
          return Ok(DecideOutcome::Refused(current));
        }

        tx.execute(
          "INSERT INTO decisions (
             decision_id, company_id, decision, actor, from_status, to_status, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            dec_id_str, id_str, decision_str, actor_str, from_str, to_str, at_str
          ],
        )?;

        let raw = tx.query_row(
          &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE company_id = ?1"),
          rusqlite::params![id_str],
          RawCompany::from_row,
        )?;
        tx.commit()?;
        Ok(DecideOutcome::Applied(raw))
      })
      .await?;

    match outcome {
      DecideOutcome::Applied(raw) => Ok((raw.into_company()?, record)),
      DecideOutcome::Refused(None) => Err(sentinel_core::Error::CompanyNotFound(id).into()),
      DecideOutcome::Refused(Some(status)) => {
        let current: CompanyStatus = decode_enum("status", &status)?;
        // A pending row would have been updated; the transition reports the
        // conflict for the terminal status that was found.
        lifecycle::transition(id, current, decision)?;
        Err(Error::Decode(format!("company {id} refused a decision while {current}")))
      }
    }
  }

  async fn decisions(&self, company_id: Uuid) -> Result<Vec<DecisionRecord>> {
    let id_str = encode_uuid(company_id);

    let raws: Vec<RawDecision> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT decision_id, company_id, decision, actor, from_status, to_status, recorded_at
           FROM decisions
           WHERE company_id = ?1
           ORDER BY recorded_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawDecision {
              decision_id: row.get(0)?,
              company_id:  row.get(1)?,
              decision:    row.get(2)?,
              actor:       row.get(3)?,
              from_status: row.get(4)?,
              to_status:   row.get(5)?,
              recorded_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDecision::into_record).collect()
  }

  async fn admin_credentials(&self, admin_email: String) -> Result<Option<AdminCredentials>> {
    let found: Option<(RawCompany, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {COMPANY_COLUMNS}, password_hash
               FROM companies
               WHERE lower(admin_email) = lower(?1)
               ORDER BY CASE status WHEN 'rejected' THEN 1 ELSE 0 END, rowid DESC
               LIMIT 1"
            ),
            rusqlite::params![admin_email.trim()],
            |row| Ok((RawCompany::from_row(row)?, row.get(12)?)),
          )
          .optional()?)
      })
      .await?;

    found
      .map(|(raw, password_hash)| {
        Ok(AdminCredentials { company: raw.into_company()?, password_hash })
      })
      .transpose()
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  async fn bulk_create_employees(
    &self,
    reg_no: String,
    rows:   Vec<NewEmployee>,
  ) -> Result<BulkOutcome> {
    let batch_at = Utc::now();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcome = BulkOutcome {
          message: "Bulk employee insertion completed".to_owned(),
          ..Default::default()
        };

        let company_active: bool = tx
          .query_row(
            "SELECT 1 FROM companies WHERE reg_no = ?1 AND status = 'active'",
            rusqlite::params![reg_no],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        for (index, row) in rows.into_iter().enumerate() {
          let n = index + 1;
          if let Some(field) = row.missing_field() {
            outcome.skip(n, format_args!("Missing required field: {field}"));
            continue;
          }
          let row_reg_no = row.company_reg_no.trim();
          if row_reg_no != reg_no {
            outcome.skip(n, format_args!("Company {row_reg_no} is not managed by this account"));
            continue;
          }
          if !company_active {
            outcome.skip(n, format_args!("Company {row_reg_no} not found"));
            continue;
          }

          let employee = row.into_employee(batch_at);
          let inserted = tx.execute(
            "INSERT OR IGNORE INTO employees (
               company_reg_no, employee_id, name, department,
               compliance_status, last_violation, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)",
            rusqlite::params![
              employee.company_reg_no,
              employee.employee_id,
              employee.name,
              employee.department,
              employee.compliance_status.as_ref(),
              encode_dt(employee.created_at),
            ],
          )?;
          if inserted == 0 {
            outcome.skip(n, "Employee already exists");
          } else {
            outcome.inserted += 1;
          }
        }

        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    tracing::debug!(inserted = outcome.inserted, skipped = outcome.skipped, "bulk employee import");
    Ok(outcome)
  }

  async fn list_employees(&self, reg_no: String) -> Result<Vec<Employee>> {
    let raws: Vec<RawEmployee> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT company_reg_no, employee_id, name, department,
                  compliance_status, last_violation, created_at
           FROM employees
           WHERE company_reg_no = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![reg_no], |row| {
            Ok(RawEmployee {
              company_reg_no:    row.get(0)?,
              employee_id:       row.get(1)?,
              name:              row.get(2)?,
              department:        row.get(3)?,
              compliance_status: row.get(4)?,
              last_violation:    row.get(5)?,
              created_at:        row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }

  async fn remove_employee(&self, reg_no: String, employee_id: String) -> Result<()> {
    let id_for_err = employee_id.clone();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM employees WHERE company_reg_no = ?1 AND employee_id = ?2",
          rusqlite::params![reg_no, employee_id],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(sentinel_core::Error::EmployeeNotFound(id_for_err).into());
    }
    Ok(())
  }
}
