//! Employees tracked for PPE compliance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplianceStatus {
  Compliant,
  NonCompliant,
  #[default]
  Unknown,
}

/// An employee of a registered company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  /// Company-scoped identifier such as `TF-001`.
  pub employee_id:       String,
  pub name:              String,
  pub department:        String,
  pub company_reg_no:    String,
  #[serde(default)]
  pub compliance_status: ComplianceStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_violation:    Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
}

/// One row of a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
  pub employee_id:    String,
  pub name:           String,
  pub department:     String,
  pub company_reg_no: String,
}

impl NewEmployee {
  /// Name of the first blank required field, if any.
  pub fn missing_field(&self) -> Option<&'static str> {
    [
      ("employee_id", &self.employee_id),
      ("name", &self.name),
      ("department", &self.department),
      ("company_reg_no", &self.company_reg_no),
    ]
    .into_iter()
    .find(|(_, v)| v.trim().is_empty())
    .map(|(k, _)| k)
  }

  /// Materialise the row; new employees start with unknown compliance.
  pub fn into_employee(self, created_at: DateTime<Utc>) -> Employee {
    Employee {
      employee_id: self.employee_id.trim().to_owned(),
      name: self.name.trim().to_owned(),
      department: self.department.trim().to_owned(),
      company_reg_no: self.company_reg_no.trim().to_owned(),
      compliance_status: ComplianceStatus::Unknown,
      last_violation: None,
      created_at,
    }
  }
}

/// Body of `POST /employee/bulk-create`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeBatch {
  pub employees: Vec<NewEmployee>,
}

/// Result of a bulk import. Rows are processed independently; a failing row
/// never aborts the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
  pub message:  String,
  pub inserted: usize,
  pub skipped:  usize,
  /// One `Row {n}: ...` line per skipped row, 1-based.
  pub errors:   Vec<String>,
}

impl BulkOutcome {
  pub fn skip(&mut self, row: usize, reason: impl std::fmt::Display) {
    self.skipped += 1;
    self.errors.push(format!("Row {row}: {reason}"));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_field_reports_first_blank() {
    let row = NewEmployee {
      employee_id:    "TF-001".into(),
      name:           " ".into(),
      department:     "".into(),
      company_reg_no: "TF".into(),
    };
    assert_eq!(row.missing_field(), Some("name"));
  }

  #[test]
  fn skip_numbers_rows() {
    let mut outcome = BulkOutcome::default();
    outcome.skip(3, "Employee already exists");
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.errors, vec!["Row 3: Employee already exists"]);
  }
}
