//! Error types for `sentinel-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::company::CompanyStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("company not found: {0}")]
  CompanyNotFound(Uuid),

  /// The company has already been decided; only `pending` records accept a
  /// decision.
  #[error("company {id} is {status}, not pending")]
  NotPending { id: Uuid, status: CompanyStatus },

  #[error("{0}")]
  Duplicate(String),

  #[error("{0}")]
  Invalid(String),

  #[error("employee not found: {0}")]
  EmployeeNotFound(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
