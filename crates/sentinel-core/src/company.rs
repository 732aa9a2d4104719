//! Company registration records.
//!
//! A company has exactly one canonical shape regardless of where it sits in
//! its lifecycle. Fields that only exist once a decision has been taken are
//! modelled as `Option`s and are absent while the record is pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Minimum length accepted for a company admin password.
pub const MIN_PASSWORD_LEN: usize = 8;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The kind of site a company operates.
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
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Industry {
  Factory,
  Lab,
  Warehouse,
  Construction,
}

/// Where a company sits in the registration lifecycle.
///
/// `Pending` is the only non-terminal state; see [`crate::lifecycle`].
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
pub enum CompanyStatus {
  #[default]
  Pending,
  Active,
  Rejected,
}

impl CompanyStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The descriptive fields supplied by the registering company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
  pub company_name:  String,
  pub industry_type: Industry,
  pub company_email: String,
  /// Registration or tax identifier; employees reference their company by it.
  pub reg_no:        String,
  pub admin_name:    String,
  pub admin_email:   String,
  /// Admin contact phone number.
  pub contact:       String,
}

impl CompanyProfile {
  /// Trim surrounding whitespace from every free-text field.
  pub fn trimmed(self) -> Self {
    Self {
      company_name:  self.company_name.trim().to_owned(),
      industry_type: self.industry_type,
      company_email: self.company_email.trim().to_owned(),
      reg_no:        self.reg_no.trim().to_owned(),
      admin_name:    self.admin_name.trim().to_owned(),
      admin_email:   self.admin_email.trim().to_owned(),
      contact:       self.contact.trim().to_owned(),
    }
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

/// A public registration submission: the profile plus the admin password.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
  #[serde(flatten)]
  pub profile:  CompanyProfile,
  pub password: String,
}

impl std::fmt::Debug for Registration {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Registration")
      .field("profile", &self.profile)
      .field("password", &"<redacted>")
      .finish()
  }
}

impl Registration {
  /// Check that the submission is well-formed.
  ///
  /// Every profile field must be non-blank, both email fields must be
  /// syntactically valid, and the password must be at least
  /// [`MIN_PASSWORD_LEN`] characters. The first failure is reported.
  pub fn validate(&self) -> Result<()> {
    let p = &self.profile;
    let required = [
      ("company_name", &p.company_name),
      ("company_email", &p.company_email),
      ("reg_no", &p.reg_no),
      ("admin_name", &p.admin_name),
      ("admin_email", &p.admin_email),
      ("contact", &p.contact),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(Error::Invalid(format!("{field} is required")));
      }
    }

    if !is_valid_email(&p.company_email) {
      return Err(Error::Invalid(format!(
        "company_email {:?} is not a valid email address",
        p.company_email
      )));
    }
    if !is_valid_email(&p.admin_email) {
      return Err(Error::Invalid(format!(
        "admin_email {:?} is not a valid email address",
        p.admin_email
      )));
    }

    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::Invalid(format!(
        "password must be at least {MIN_PASSWORD_LEN} characters"
      )));
    }

    Ok(())
  }
}

/// Syntactic email check: one `@`, a non-empty local part, and a domain with
/// an interior dot. No whitespace anywhere.
pub fn is_valid_email(address: &str) -> bool {
  let address = address.trim();
  if address.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = address.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
    None => false,
  }
}

// ─── Company ─────────────────────────────────────────────────────────────────

/// A company record as held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
  pub id:         Uuid,
  #[serde(flatten)]
  pub profile:    CompanyProfile,
  pub status:     CompanyStatus,
  /// Server-assigned on registration; never changes.
  pub created_at: DateTime<Utc>,
  /// Set together with `decided_by` when the record leaves `pending`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub decided_at: Option<DateTime<Utc>>,
  /// Email of the platform admin who took the decision.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub decided_by: Option<String>,
}

impl Company {
  /// A freshly registered, pending record.
  pub fn pending(profile: CompanyProfile) -> Self {
    Self {
      id: Uuid::new_v4(),
      profile,
      status: CompanyStatus::Pending,
      created_at: Utc::now(),
      decided_at: None,
      decided_by: None,
    }
  }

  /// Shorthand reference used inside identities.
  pub fn reference(&self) -> CompanyRef {
    CompanyRef {
      company_id:    self.id,
      company_name:  self.profile.company_name.clone(),
      reg_no:        self.profile.reg_no.clone(),
      industry_type: self.profile.industry_type,
    }
  }
}

/// The subset of a company carried by a company admin's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
  pub company_id:    Uuid,
  pub company_name:  String,
  pub reg_no:        String,
  pub industry_type: Industry,
}
