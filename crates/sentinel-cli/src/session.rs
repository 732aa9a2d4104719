//! The locally persisted login session and the role guards built on it.
//!
//! A session is loaded once at startup, saved on login and cleared on logout.
//! It is handed to each command explicitly.

use std::{io, path::Path};

use anyhow::{Context, Result};
use sentinel_core::identity::{Identity, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub token:    String,
  pub identity: Identity,
}

impl Session {
  /// Read the session file. A missing file means "logged out".
  pub fn load(path: &Path) -> Result<Option<Self>> {
    let raw = match std::fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(e).with_context(|| format!("reading session file {}", path.display()));
      }
    };
    let session = serde_json::from_str(&raw)
      .with_context(|| format!("parsing session file {}", path.display()))?;
    Ok(Some(session))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(self).context("serialising session")?;
    std::fs::write(path, raw)
      .with_context(|| format!("writing session file {}", path.display()))?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt as _;
      std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restricting permissions on {}", path.display()))?;
    }
    Ok(())
  }

  /// Remove the session file; succeeds if it was already gone.
  pub fn clear(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing session file {}", path.display())),
    }
  }
}

// ─── Guards ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
  #[error("not logged in; run `sentinel login` first")]
  NotLoggedIn,

  #[error("this command requires the {required} role, but you are logged in as {actual}")]
  WrongRole { required: Role, actual: Role },
}

/// Any logged-in session.
pub fn require_login(session: Option<&Session>) -> Result<&Session, GuardError> {
  session.ok_or(GuardError::NotLoggedIn)
}

/// A session holding `role`.
pub fn require_role(session: Option<&Session>, role: Role) -> Result<&Session, GuardError> {
  let session = require_login(session)?;
  if !session.identity.has_role(role) {
    return Err(GuardError::WrongRole { required: role, actual: session.identity.role });
  }
  Ok(session)
}
