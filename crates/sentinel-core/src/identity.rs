//! Authenticated identities and their roles.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::company::{Company, CompanyRef};

/// The two roles the dashboard distinguishes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  /// Cross-company super-admin; decides registrations.
  PlatformAdmin,
  /// Scoped to a single, active company.
  CompanyAdmin,
}

/// Who is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub role:    Role,
  pub name:    String,
  pub email:   String,
  /// Present for company admins only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company: Option<CompanyRef>,
}

impl Identity {
  pub fn platform_admin(name: impl Into<String>, email: impl Into<String>) -> Self {
    Self {
      role:    Role::PlatformAdmin,
      name:    name.into(),
      email:   email.into(),
      company: None,
    }
  }

  pub fn company_admin(company: &Company) -> Self {
    Self {
      role:    Role::CompanyAdmin,
      name:    company.profile.admin_name.clone(),
      email:   company.profile.admin_email.clone(),
      company: Some(company.reference()),
    }
  }

  pub fn has_role(&self, role: Role) -> bool { self.role == role }

  /// Registration number of the company this identity administers.
  pub fn reg_no(&self) -> Option<&str> {
    self.company.as_ref().map(|c| c.reg_no.as_str())
  }
}
