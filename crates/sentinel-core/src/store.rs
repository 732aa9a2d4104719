//! The `RegistryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `sentinel-store-sqlite`).
//! Higher layers (`sentinel-api`, `sentinel-server`) depend on this
//! abstraction, not on any concrete backend. The backend is the enforcement
//! point for the lifecycle: a decision must be applied atomically so that two
//! racing decisions on one pending record cannot both succeed.

use std::future::Future;

use uuid::Uuid;

use crate::{
  company::{Company, CompanyProfile, CompanyStatus},
  employee::{BulkOutcome, Employee, NewEmployee},
  lifecycle::{Decision, DecisionRecord},
};

/// Backend errors must expose the domain error they carry, if any, so the
/// HTTP layer can map conflicts and missing records to the right status.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn registry_error(&self) -> Option<&crate::Error>;
}

impl StoreError for crate::Error {
  fn registry_error(&self) -> Option<&crate::Error> { Some(self) }
}

/// A company admin's login material.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
  pub company:       Company,
  /// argon2 PHC string.
  pub password_hash: String,
}

/// Abstraction over a Sentinel registry backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: StoreError;

  // ── Companies ─────────────────────────────────────────────────────────

  /// Persist a new `pending` company.
  ///
  /// Fails with [`crate::Error::Duplicate`] if a pending or active company
  /// already uses the same company or admin email (case-insensitive).
  fn register(
    &self,
    profile: CompanyProfile,
    password_hash: String,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  /// Retrieve a company by id. Returns `None` if not found.
  fn get_company(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Company>, Self::Error>> + Send + '_;

  /// List companies in registration order, optionally restricted to one
  /// status.
  fn list_companies(
    &self,
    status: Option<CompanyStatus>,
  ) -> impl Future<Output = Result<Vec<Company>, Self::Error>> + Send + '_;

  /// Apply a decision to a pending company and log it.
  ///
  /// Fails with [`crate::Error::CompanyNotFound`] or
  /// [`crate::Error::NotPending`]; on failure nothing is written.
  fn decide(
    &self,
    id: Uuid,
    decision: Decision,
    actor: String,
  ) -> impl Future<Output = Result<(Company, DecisionRecord), Self::Error>> + Send + '_;

  /// The decision log for one company, oldest first.
  fn decisions(
    &self,
    company_id: Uuid,
  ) -> impl Future<Output = Result<Vec<DecisionRecord>, Self::Error>> + Send + '_;

  /// Look up login material by admin email (case-insensitive), preferring a
  /// non-rejected record when several exist.
  fn admin_credentials(
    &self,
    admin_email: String,
  ) -> impl Future<Output = Result<Option<AdminCredentials>, Self::Error>> + Send + '_;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Insert employees for the active company `reg_no`, row by row.
  ///
  /// Rows naming another company, rows with blank fields, and duplicates are
  /// skipped and reported; they never abort the batch.
  fn bulk_create_employees(
    &self,
    reg_no: String,
    rows: Vec<NewEmployee>,
  ) -> impl Future<Output = Result<BulkOutcome, Self::Error>> + Send + '_;

  fn list_employees(
    &self,
    reg_no: String,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  /// Fails with [`crate::Error::EmployeeNotFound`] if absent.
  fn remove_employee(
    &self,
    reg_no: String,
    employee_id: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
