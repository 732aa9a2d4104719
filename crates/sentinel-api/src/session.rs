//! Bearer-token sessions and the role extractors built on them.
//!
//! Tokens are 32 random bytes, base64url-encoded without padding. The table
//! keys sessions by the hex SHA-256 digest of the token, so the token itself
//! is never held after it has been handed to the client.

use std::collections::HashMap;

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, RngCore as _};
use sentinel_core::{
  company::CompanyRef,
  identity::{Identity, Role},
  store::RegistryStore,
};
use sha2::{Digest as _, Sha256};
use tokio::sync::RwLock;

use crate::{AppState, error::ApiError};

const TOKEN_BYTES: usize = 32;

/// Live sessions kept per identity; issuing past this evicts the oldest.
pub const MAX_SESSIONS_PER_IDENTITY: usize = 8;

// ─── Table ───────────────────────────────────────────────────────────────────

struct Entry {
  identity: Identity,
  issued:   u64,
}

#[derive(Default)]
struct Inner {
  sessions: HashMap<String, Entry>,
  next:     u64,
}

/// In-memory session table. Sessions live until logout, eviction by a newer
/// login of the same identity, or server restart.
#[derive(Default)]
pub struct SessionTable {
  inner: RwLock<Inner>,
}

fn digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

fn same_holder(a: &Identity, b: &Identity) -> bool {
  a.role == b.role && a.email.eq_ignore_ascii_case(&b.email)
}

impl SessionTable {
  pub fn new() -> Self { Self::default() }

  /// Start a session for `identity` and return its bearer token.
  pub async fn issue(&self, identity: Identity) -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);

    let mut inner = self.inner.write().await;
    let mut held: Vec<(u64, String)> = inner
      .sessions
      .iter()
      .filter(|(_, e)| same_holder(&e.identity, &identity))
      .map(|(k, e)| (e.issued, k.clone()))
      .collect();
    if held.len() >= MAX_SESSIONS_PER_IDENTITY {
      held.sort_unstable();
      let excess = held.len() + 1 - MAX_SESSIONS_PER_IDENTITY;
      for (_, key) in held.into_iter().take(excess) {
        inner.sessions.remove(&key);
      }
      tracing::debug!(email = %identity.email, excess, "evicted oldest sessions");
    }

    let issued = inner.next;
    inner.next += 1;
    inner.sessions.insert(digest(&token), Entry { identity, issued });
    token
  }

  pub async fn resolve(&self, token: &str) -> Option<Identity> {
    let inner = self.inner.read().await;
    inner.sessions.get(&digest(token)).map(|e| e.identity.clone())
  }

  /// Returns `false` if the token was not live.
  pub async fn revoke(&self, token: &str) -> bool {
    self.inner.write().await.sessions.remove(&digest(token)).is_some()
  }

  pub async fn len(&self) -> usize { self.inner.read().await.sessions.len() }
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Any logged-in caller.
#[derive(Debug, Clone)]
pub struct Authenticated {
  pub identity: Identity,
  pub token:    String,
}

/// A caller holding the platform-admin role.
#[derive(Debug, Clone)]
pub struct PlatformAdmin(pub Identity);

/// A caller administering one company.
#[derive(Debug, Clone)]
pub struct CompanyAdmin {
  pub identity: Identity,
  pub company:  CompanyRef,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
  parts
    .headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: RegistryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(parts)
      .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?
      .to_owned();
    let identity = state
      .sessions
      .resolve(&token)
      .await
      .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".into()))?;
    Ok(Authenticated { identity, token })
  }
}

impl<S> FromRequestParts<AppState<S>> for PlatformAdmin
where
  S: RegistryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Authenticated { identity, .. } = Authenticated::from_request_parts(parts, state).await?;
    if !identity.has_role(Role::PlatformAdmin) {
      return Err(ApiError::Forbidden("Platform admin access required".into()));
    }
    Ok(PlatformAdmin(identity))
  }
}

impl<S> FromRequestParts<AppState<S>> for CompanyAdmin
where
  S: RegistryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Authenticated { identity, .. } = Authenticated::from_request_parts(parts, state).await?;
    let company = match (&identity.role, &identity.company) {
      (Role::CompanyAdmin, Some(company)) => company.clone(),
      _ => return Err(ApiError::Forbidden("Company admin access required".into())),
    };
    Ok(CompanyAdmin { identity, company })
  }
}
