//! PPE violation records. Detection is out of scope; these come from fixtures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Personal protective equipment tracked by label only.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PpeKind {
  Helmet,
  Gloves,
  Goggles,
  Mask,
  Shoes,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
  pub violation_id:    String,
  pub employee_id:     String,
  pub employee_name:   String,
  pub company_reg_no:  String,
  pub missing_ppe:     Vec<PpeKind>,
  pub timestamp:       DateTime<Utc>,
  pub camera_location: String,
  pub severity:        Severity,
}

impl Violation {
  pub fn is_missing(&self, kind: PpeKind) -> bool { self.missing_ppe.contains(&kind) }
}
