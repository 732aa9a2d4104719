//! The company lifecycle: `pending → active | rejected`.
//!
//! A decision is only valid against a pending record. Terminal records never
//! move again; a second decision is a conflict, not a no-op. Every successful
//! decision is recorded in an append-only log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, company::CompanyStatus};

/// The two decisions a platform admin can take on a pending registration.
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
pub enum Decision {
  Approve,
  Reject,
}

impl Decision {
  /// The status a pending record ends up in after this decision.
  pub fn target(self) -> CompanyStatus {
    match self {
      Self::Approve => CompanyStatus::Active,
      Self::Reject => CompanyStatus::Rejected,
    }
  }
}

/// Apply `decision` to a company currently in `current`.
///
/// Returns the new status, or [`Error::NotPending`] if the record has already
/// been decided.
pub fn transition(
  id: Uuid,
  current: CompanyStatus,
  decision: Decision,
) -> Result<CompanyStatus> {
  match current {
    CompanyStatus::Pending => Ok(decision.target()),
    status @ (CompanyStatus::Active | CompanyStatus::Rejected) => {
      Err(Error::NotPending { id, status })
    }
  }
}

/// One entry of the decision log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
  pub decision_id: Uuid,
  pub company_id:  Uuid,
  pub decision:    Decision,
  /// Email of the platform admin who issued the decision.
  pub actor:       String,
  pub from:        CompanyStatus,
  pub to:          CompanyStatus,
  pub recorded_at: DateTime<Utc>,
}
