//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use sentinel_core::{
  company::{CompanyProfile, CompanyStatus, Industry},
  employee::{ComplianceStatus, NewEmployee},
  lifecycle::Decision,
  store::RegistryStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn profile(name: &str, reg_no: &str) -> CompanyProfile {
  let slug = name.to_lowercase().replace(' ', "");
  CompanyProfile {
    company_name:  name.into(),
    industry_type: Industry::Factory,
    company_email: format!("info@{slug}.com"),
    reg_no:        reg_no.into(),
    admin_name:    format!("{name} Admin"),
    admin_email:   format!("admin@{slug}.com"),
    contact:       "555-0100".into(),
  }
}

const ADMIN: &str = "root@sentinel.io";

fn is_not_pending(err: &Error) -> bool {
  matches!(err, Error::Core(sentinel_core::Error::NotPending { .. }))
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_creates_pending_company() {
  let s = store().await;

  let company = s.register(profile("Acme", "ACME-1"), "hash".into()).await.unwrap();
  assert_eq!(company.status, CompanyStatus::Pending);
  assert!(company.decided_at.is_none());
  assert!(company.decided_by.is_none());

  let fetched = s.get_company(company.id).await.unwrap().unwrap();
  assert_eq!(fetched, company);

  let pending = s.list_companies(Some(CompanyStatus::Pending)).await.unwrap();
  assert_eq!(pending, vec![company]);
  assert!(s.list_companies(Some(CompanyStatus::Active)).await.unwrap().is_empty());
}

#[tokio::test]
async fn register_trims_profile_fields() {
  let s = store().await;
  let mut p = profile("Acme", "ACME-1");
  p.company_name = "  Acme  ".into();
  let company = s.register(p, "hash".into()).await.unwrap();
  assert_eq!(company.profile.company_name, "Acme");
}

#[tokio::test]
async fn get_company_missing_returns_none() {
  let s = store().await;
  assert!(s.get_company(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_companies_keeps_registration_order() {
  let s = store().await;
  let a = s.register(profile("Alpha", "A-1"), "h".into()).await.unwrap();
  let b = s.register(profile("Beta", "B-1"), "h".into()).await.unwrap();
  let c = s.register(profile("Gamma", "C-1"), "h".into()).await.unwrap();
  s.decide(b.id, Decision::Approve, ADMIN.into()).await.unwrap();

  let all = s.list_companies(None).await.unwrap();
  let ids: Vec<_> = all.iter().map(|c| c.id).collect();
  assert_eq!(ids, vec![a.id, b.id, c.id]);

  let pending = s.list_companies(Some(CompanyStatus::Pending)).await.unwrap();
  assert_eq!(pending.len(), 2);
  assert!(pending.iter().all(|c| c.status == CompanyStatus::Pending));
}

#[tokio::test]
async fn duplicate_emails_are_refused_case_insensitively() {
  let s = store().await;
  s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();

  let mut again = profile("Acme Two", "ACME-2");
  again.company_email = "INFO@acme.com".into();
  let err = s.register(again, "h".into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(sentinel_core::Error::Duplicate(_))));
  assert!(err.to_string().contains("company email"));

  let mut again = profile("Acme Three", "ACME-3");
  again.admin_email = "Admin@Acme.com".into();
  let err = s.register(again, "h".into()).await.unwrap_err();
  assert!(err.to_string().contains("admin email"));

  assert_eq!(s.list_companies(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_reg_no_is_refused() {
  let s = store().await;
  s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();
  let err = s.register(profile("Other", "ACME-1"), "h".into()).await.unwrap_err();
  assert!(err.to_string().contains("registration number"));
}

#[tokio::test]
async fn rejected_company_may_reapply() {
  let s = store().await;
  let first = s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();
  s.decide(first.id, Decision::Reject, ADMIN.into()).await.unwrap();

  let second = s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();
  assert_ne!(second.id, first.id);
  assert_eq!(second.status, CompanyStatus::Pending);

  // The rejected record is kept untouched.
  let first = s.get_company(first.id).await.unwrap().unwrap();
  assert_eq!(first.status, CompanyStatus::Rejected);
}

// ─── Decisions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn approve_activates_and_logs() {
  let s = store().await;
  let company = s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();

  let (decided, record) = s.decide(company.id, Decision::Approve, ADMIN.into()).await.unwrap();
  assert_eq!(decided.status, CompanyStatus::Active);
  assert_eq!(decided.decided_by.as_deref(), Some(ADMIN));
  assert_eq!(decided.decided_at, Some(record.recorded_at));
  assert_eq!(decided.created_at, company.created_at);
  assert_eq!(decided.profile, company.profile);

  assert_eq!(record.from, CompanyStatus::Pending);
  assert_eq!(record.to, CompanyStatus::Active);
  assert_eq!(s.decisions(company.id).await.unwrap(), vec![record]);
}

#[tokio::test]
async fn reject_marks_rejected() {
  let s = store().await;
  let company = s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();

  let (decided, record) = s.decide(company.id, Decision::Reject, ADMIN.into()).await.unwrap();
  assert_eq!(decided.status, CompanyStatus::Rejected);
  assert_eq!(record.decision, Decision::Reject);
  assert!(s.list_companies(Some(CompanyStatus::Pending)).await.unwrap().is_empty());
}

#[tokio::test]
async fn second_decision_conflicts_and_changes_nothing() {
  let s = store().await;
  let company = s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();
  let (approved, _) = s.decide(company.id, Decision::Approve, ADMIN.into()).await.unwrap();

  for decision in [Decision::Approve, Decision::Reject] {
    let err = s.decide(company.id, decision, "other@sentinel.io".into()).await.unwrap_err();
    assert!(is_not_pending(&err), "unexpected error: {err}");
  }

  assert_eq!(s.get_company(company.id).await.unwrap().unwrap(), approved);
  assert_eq!(s.decisions(company.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn decide_unknown_company_is_not_found() {
  let s = store().await;
  let id = Uuid::new_v4();
  let err = s.decide(id, Decision::Approve, ADMIN.into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(sentinel_core::Error::CompanyNotFound(got)) if got == id));
}

#[tokio::test]
async fn racing_decisions_have_exactly_one_winner() {
  let s = store().await;
  let company = s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();

  let (a, b) = (s.clone(), s.clone());
  let (approve, reject) = tokio::join!(
    a.decide(company.id, Decision::Approve, "first@sentinel.io".into()),
    b.decide(company.id, Decision::Reject, "second@sentinel.io".into()),
  );

  let (winner, loser) = match (approve, reject) {
    (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
    (a, b) => panic!("expected exactly one winner, got {a:?} and {b:?}"),
  };
  assert!(is_not_pending(&loser));

  let stored = s.get_company(company.id).await.unwrap().unwrap();
  assert_eq!(stored.status, winner.0.status);
  assert_eq!(s.decisions(company.id).await.unwrap(), vec![winner.1]);
}

#[tokio::test]
async fn decisions_for_undecided_company_is_empty() {
  let s = store().await;
  let company = s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();
  assert!(s.decisions(company.id).await.unwrap().is_empty());
}

// ─── Credentials ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_credentials_by_email() {
  let s = store().await;
  let company = s.register(profile("Acme", "ACME-1"), "phc-hash".into()).await.unwrap();

  let creds = s.admin_credentials("ADMIN@acme.com".into()).await.unwrap().unwrap();
  assert_eq!(creds.company.id, company.id);
  assert_eq!(creds.password_hash, "phc-hash");

  assert!(s.admin_credentials("nobody@acme.com".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn admin_credentials_prefer_live_record() {
  let s = store().await;
  let old = s.register(profile("Acme", "ACME-1"), "old".into()).await.unwrap();
  s.decide(old.id, Decision::Reject, ADMIN.into()).await.unwrap();
  let new = s.register(profile("Acme", "ACME-1"), "new".into()).await.unwrap();

  let creds = s.admin_credentials("admin@acme.com".into()).await.unwrap().unwrap();
  assert_eq!(creds.company.id, new.id);
  assert_eq!(creds.password_hash, "new");
}

// ─── Employees ───────────────────────────────────────────────────────────────

fn row(id: &str, name: &str, reg_no: &str) -> NewEmployee {
  NewEmployee {
    employee_id:    id.into(),
    name:           name.into(),
    department:     "Assembly".into(),
    company_reg_no: reg_no.into(),
  }
}

async fn active_company(s: &SqliteStore, reg_no: &str) {
  let company = s.register(profile(reg_no, reg_no), "h".into()).await.unwrap();
  s.decide(company.id, Decision::Approve, ADMIN.into()).await.unwrap();
}

#[tokio::test]
async fn bulk_create_reports_each_skipped_row() {
  let s = store().await;
  active_company(&s, "ACME-1").await;

  let before = Utc::now();
  let outcome = s
    .bulk_create_employees("ACME-1".into(), vec![
      row("E-1", "Ada", "ACME-1"),
      row("E-2", "", "ACME-1"),
      row("E-3", "Cy", "OTHER-9"),
      row("E-1", "Ada again", "ACME-1"),
      row("E-4", "Dee", " ACME-1 "),
    ])
    .await
    .unwrap();

  assert_eq!(outcome.message, "Bulk employee insertion completed");
  assert_eq!(outcome.inserted, 2);
  assert_eq!(outcome.skipped, 3);
  assert_eq!(outcome.errors, vec![
    "Row 2: Missing required field: name",
    "Row 3: Company OTHER-9 is not managed by this account",
    "Row 4: Employee already exists",
  ]);

  let employees = s.list_employees("ACME-1".into()).await.unwrap();
  let ids: Vec<_> = employees.iter().map(|e| e.employee_id.as_str()).collect();
  assert_eq!(ids, vec!["E-1", "E-4"]);
  assert_eq!(employees[0].name, "Ada");
  assert!(employees.iter().all(|e| e.compliance_status == ComplianceStatus::Unknown));

  // One batch, one creation instant.
  assert_eq!(employees[0].created_at, employees[1].created_at);
  let slack = Duration::seconds(1);
  assert!(employees[0].created_at >= before - slack);
  assert!(employees[0].created_at <= Utc::now() + slack);
}

#[tokio::test]
async fn bulk_create_requires_active_company() {
  let s = store().await;
  s.register(profile("Acme", "ACME-1"), "h".into()).await.unwrap();

  let outcome = s
    .bulk_create_employees("ACME-1".into(), vec![row("E-1", "Ada", "ACME-1")])
    .await
    .unwrap();
  assert_eq!(outcome.inserted, 0);
  assert_eq!(outcome.errors, vec!["Row 1: Company ACME-1 not found"]);
}

#[tokio::test]
async fn employees_are_scoped_per_company() {
  let s = store().await;
  active_company(&s, "ACME-1").await;
  active_company(&s, "BETA-2").await;

  s.bulk_create_employees("ACME-1".into(), vec![row("E-1", "Ada", "ACME-1")])
    .await
    .unwrap();
  let outcome = s
    .bulk_create_employees("BETA-2".into(), vec![row("E-1", "Bo", "BETA-2")])
    .await
    .unwrap();
  assert_eq!(outcome.inserted, 1);

  assert_eq!(s.list_employees("ACME-1".into()).await.unwrap()[0].name, "Ada");
  assert_eq!(s.list_employees("BETA-2".into()).await.unwrap()[0].name, "Bo");
}

#[tokio::test]
async fn remove_employee() {
  let s = store().await;
  active_company(&s, "ACME-1").await;
  s.bulk_create_employees("ACME-1".into(), vec![row("E-1", "Ada", "ACME-1")])
    .await
    .unwrap();

  // Another company cannot remove it.
  let err = s.remove_employee("BETA-2".into(), "E-1".into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(sentinel_core::Error::EmployeeNotFound(_))));

  s.remove_employee("ACME-1".into(), "E-1".into()).await.unwrap();
  assert!(s.list_employees("ACME-1".into()).await.unwrap().is_empty());

  let err = s.remove_employee("ACME-1".into(), "E-1".into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(sentinel_core::Error::EmployeeNotFound(_))));
}
