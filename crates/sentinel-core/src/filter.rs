//! In-memory list filters for the dashboard views.
//!
//! Every filter is a conjunction: a case-insensitive substring search over a
//! few designated text fields, AND zero or more exact-match categorical
//! choices. An empty search and [`Choice::All`] both match everything. Input
//! order is preserved; nothing is indexed.

use std::{fmt, str::FromStr};

use crate::{
  camera::{Camera, CameraStatus},
  company::{Company, CompanyStatus},
  employee::{ComplianceStatus, Employee},
  violation::{PpeKind, Severity, Violation},
};

// ─── Choice ──────────────────────────────────────────────────────────────────

/// A categorical filter value: either `all` or one specific value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
  All,
  Only(T),
}

impl<T> Default for Choice<T> {
  fn default() -> Self { Self::All }
}

impl<T: PartialEq> Choice<T> {
  pub fn admits(&self, value: &T) -> bool {
    match self {
      Self::All => true,
      Self::Only(v) => v == value,
    }
  }
}

impl<T: FromStr> FromStr for Choice<T> {
  type Err = T::Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.eq_ignore_ascii_case("all") {
      Ok(Self::All)
    } else {
      s.parse().map(Self::Only)
    }
  }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str("all"),
      Self::Only(v) => v.fmt(f),
    }
  }
}

// ─── Text search ─────────────────────────────────────────────────────────────

/// `true` if `query` occurs, ignoring case, in at least one of `fields`.
pub fn matches_text(query: &str, fields: &[&str]) -> bool {
  if query.is_empty() {
    return true;
  }
  let needle = query.to_lowercase();
  fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

// ─── Filter trait ────────────────────────────────────────────────────────────

pub trait Filter<T> {
  fn matches(&self, item: &T) -> bool;

  /// Borrow the matching items, in input order.
  fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
    items.iter().filter(|item| self.matches(item)).collect()
  }
}

// ─── Views ───────────────────────────────────────────────────────────────────

/// Employees: name, employee id, or department; by compliance status.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
  pub search: String,
  pub status: Choice<ComplianceStatus>,
}

impl Filter<Employee> for EmployeeFilter {
  fn matches(&self, e: &Employee) -> bool {
    matches_text(&self.search, &[e.name.as_str(), e.employee_id.as_str(), e.department.as_str()])
      && self.status.admits(&e.compliance_status)
  }
}

/// Violations: employee name, employee id, or camera location; by severity
/// and by one missing PPE kind.
#[derive(Debug, Clone, Default)]
pub struct ViolationFilter {
  pub search:   String,
  pub severity: Choice<Severity>,
  pub ppe:      Choice<PpeKind>,
}

impl Filter<Violation> for ViolationFilter {
  fn matches(&self, v: &Violation) -> bool {
    let ppe_ok = match self.ppe {
      Choice::All => true,
      Choice::Only(kind) => v.is_missing(kind),
    };
    matches_text(&self.search, &[
      v.employee_name.as_str(),
      v.employee_id.as_str(),
      v.camera_location.as_str(),
    ])
      && self.severity.admits(&v.severity)
      && ppe_ok
  }
}

/// Cameras: name or location; by status.
#[derive(Debug, Clone, Default)]
pub struct CameraFilter {
  pub search: String,
  pub status: Choice<CameraStatus>,
}

impl Filter<Camera> for CameraFilter {
  fn matches(&self, c: &Camera) -> bool {
    matches_text(&self.search, &[c.name.as_str(), c.location.as_str()]) && self.status.admits(&c.status)
  }
}

/// Companies: name or admin email; by lifecycle status.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
  pub search: String,
  pub status: Choice<CompanyStatus>,
}

impl Filter<Company> for CompanyFilter {
  fn matches(&self, c: &Company) -> bool {
    matches_text(&self.search, &[
      c.profile.company_name.as_str(),
      c.profile.admin_email.as_str(),
    ])
      && self.status.admits(&c.status)
  }
}
