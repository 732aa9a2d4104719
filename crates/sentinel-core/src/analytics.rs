//! Aggregate counts shown on the dashboards.
//!
//! All summaries are plain linear scans over collections that have already
//! been fetched; nothing is cached.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  camera::{Camera, CameraStatus},
  company::{Company, CompanyStatus},
  employee::{ComplianceStatus, Employee},
  violation::{PpeKind, Severity, Violation},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
  pub total:           usize,
  pub compliant:       usize,
  pub non_compliant:   usize,
  pub unknown:         usize,
  /// Percentage of compliant employees; `0.0` for an empty roster.
  pub compliance_rate: f64,
}

pub fn summarize_employees(employees: &[Employee]) -> EmployeeSummary {
  let mut s = EmployeeSummary { total: employees.len(), ..Default::default() };
  for e in employees {
    match e.compliance_status {
      ComplianceStatus::Compliant => s.compliant += 1,
      ComplianceStatus::NonCompliant => s.non_compliant += 1,
      ComplianceStatus::Unknown => s.unknown += 1,
    }
  }
  if s.total > 0 {
    s.compliance_rate = s.compliant as f64 * 100.0 / s.total as f64;
  }
  s
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationSummary {
  pub total:  usize,
  pub high:   usize,
  pub medium: usize,
  pub low:    usize,
  /// How often each PPE item was missing. A violation missing two items
  /// counts once for each.
  pub by_ppe: BTreeMap<PpeKind, usize>,
  /// Violations on the same UTC calendar day as the reference instant.
  pub today:  usize,
}

pub fn summarize_violations(violations: &[Violation], now: DateTime<Utc>) -> ViolationSummary {
  let mut s = ViolationSummary { total: violations.len(), ..Default::default() };
  let today = now.date_naive();
  for v in violations {
    match v.severity {
      Severity::High => s.high += 1,
      Severity::Medium => s.medium += 1,
      Severity::Low => s.low += 1,
    }
    for kind in &v.missing_ppe {
      *s.by_ppe.entry(*kind).or_default() += 1;
    }
    if v.timestamp.date_naive() == today {
      s.today += 1;
    }
  }
  s
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSummary {
  pub total:       usize,
  pub active:      usize,
  pub inactive:    usize,
  pub maintenance: usize,
}

pub fn summarize_cameras(cameras: &[Camera]) -> CameraSummary {
  let mut s = CameraSummary { total: cameras.len(), ..Default::default() };
  for c in cameras {
    match c.status {
      CameraStatus::Active => s.active += 1,
      CameraStatus::Inactive => s.inactive += 1,
      CameraStatus::Maintenance => s.maintenance += 1,
    }
  }
  s
}

/// Cross-company overview for the platform admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSummary {
  pub total_companies:   usize,
  pub active_companies:  usize,
  pub pending_companies: usize,
  pub violations:        ViolationSummary,
  /// Violations per company, keyed by company name where the company is
  /// known and by registration number otherwise.
  pub by_company:        BTreeMap<String, usize>,
}

pub fn summarize_platform(
  companies: &[Company],
  violations: &[Violation],
  now: DateTime<Utc>,
) -> PlatformSummary {
  let mut by_company = BTreeMap::new();
  for v in violations {
    let label = companies
      .iter()
      .find(|c| c.profile.reg_no == v.company_reg_no)
      .map_or(v.company_reg_no.as_str(), |c| c.profile.company_name.as_str());
    *by_company.entry(label.to_owned()).or_default() += 1;
  }

  PlatformSummary {
    total_companies: companies.len(),
    active_companies: companies.iter().filter(|c| c.status == CompanyStatus::Active).count(),
    pending_companies: companies.iter().filter(|c| c.status == CompanyStatus::Pending).count(),
    violations: summarize_violations(violations, now),
    by_company,
  }
}
