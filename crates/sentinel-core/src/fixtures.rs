//! Static demo data standing in for live detection output.
//!
//! The dataset ships with the crate so every view has something to show
//! without a detection pipeline. Alternative datasets with the same JSON
//! shape can be loaded with [`Dataset::from_json`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  camera::{Camera, NewCamera},
  employee::Employee,
  violation::Violation,
};

const DEMO_JSON: &str = include_str!("../fixtures/demo.json");

/// A bundle of employees, violations and cameras across companies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
  #[serde(default)]
  pub employees:  Vec<Employee>,
  #[serde(default)]
  pub violations: Vec<Violation>,
  #[serde(default)]
  pub cameras:    Vec<Camera>,
}

impl Dataset {
  /// Parse a dataset. Every violation must name at least one missing item.
  pub fn from_json(raw: &str) -> Result<Self> {
    let data: Self = serde_json::from_str(raw)?;
    if let Some(v) = data.violations.iter().find(|v| v.missing_ppe.is_empty()) {
      return Err(Error::Invalid(format!(
        "violation {} lists no missing PPE",
        v.violation_id
      )));
    }
    Ok(data)
  }

  /// Add a camera for `company_reg_no` under the next free `cam-<n>` id.
  pub fn add_camera(
    &mut self,
    new: NewCamera,
    company_reg_no: &str,
    now: DateTime<Utc>,
  ) -> Result<&Camera> {
    if let Some(field) = new.missing_field() {
      return Err(Error::Invalid(format!("Missing required field: {field}")));
    }
    let next = self
      .cameras
      .iter()
      .filter_map(|c| c.camera_id.strip_prefix("cam-")?.parse::<u32>().ok())
      .max()
      .unwrap_or(0)
      + 1;
    let camera = new.into_camera(format!("cam-{next}"), company_reg_no, now);
    self.cameras.push(camera);
    Ok(&self.cameras[self.cameras.len() - 1])
  }

  /// Only the records belonging to the company with `reg_no`.
  pub fn for_company(&self, reg_no: &str) -> Self {
    Self {
      employees:  self
        .employees
        .iter()
        .filter(|e| e.company_reg_no == reg_no)
        .cloned()
        .collect(),
      violations: self
        .violations
        .iter()
        .filter(|v| v.company_reg_no == reg_no)
        .cloned()
        .collect(),
      cameras:    self
        .cameras
        .iter()
        .filter(|c| c.company_reg_no == reg_no)
        .cloned()
        .collect(),
    }
  }
}

/// The bundled demo dataset.
pub fn demo() -> Result<Dataset> { Dataset::from_json(DEMO_JSON) }
