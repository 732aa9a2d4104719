//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login`  | Body: `{"username":"…","password":"…"}` |
//! | `POST` | `/auth/logout` | Bearer token; 204 |

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use sentinel_core::{company::CompanyStatus, identity::Identity, store::RegistryStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, session::Authenticated};

/// Login material for the single platform admin, from server configuration.
#[derive(Clone)]
pub struct PlatformAccount {
  pub name:          String,
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
  /// The platform admin email or a company admin email.
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
  pub message:  String,
  pub token:    String,
  pub identity: Identity,
}

fn invalid_credentials() -> ApiError {
  ApiError::Unauthorized("Invalid username or password".into())
}

/// Check `password` against an argon2 PHC string.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), ApiError> {
  let parsed = PasswordHash::new(password_hash).map_err(|e| {
    tracing::warn!(error = %e, "stored password hash is malformed");
    invalid_credentials()
  })?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| invalid_credentials())
}

// ─── Login ───────────────────────────────────────────────────────────────────

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: RegistryStore + 'static,
{
  let Json(body) = payload?;
  let username = body.username.trim();

  let identity = if username.eq_ignore_ascii_case(&state.platform.email) {
    verify_password(&body.password, &state.platform.password_hash).inspect_err(|_| {
      tracing::warn!(username, "failed platform admin login");
    })?;
    Identity::platform_admin(&state.platform.name, &state.platform.email)
  } else {
    let creds = state
      .store
      .admin_credentials(username.to_owned())
      .await
      .map_err(ApiError::from_store)?
      .ok_or_else(invalid_credentials)?;
    verify_password(&body.password, &creds.password_hash).inspect_err(|_| {
      tracing::warn!(username, "failed company admin login");
    })?;

    match creds.company.status {
      CompanyStatus::Active => Identity::company_admin(&creds.company),
      CompanyStatus::Pending => {
        return Err(ApiError::Forbidden(
          "Company registration is pending approval".into(),
        ));
      }
      CompanyStatus::Rejected => {
        return Err(ApiError::Forbidden("Company registration was rejected".into()));
      }
    }
  };

  let token = state.sessions.issue(identity.clone()).await;
  tracing::info!(role = %identity.role, email = %identity.email, "login");

  Ok(Json(LoginResponse {
    message: "Login successful".into(),
    token,
    identity,
  }))
}

// ─── Logout ──────────────────────────────────────────────────────────────────

/// `POST /auth/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> StatusCode
where
  S: RegistryStore + 'static,
{
  state.sessions.revoke(&auth.token).await;
  tracing::info!(email = %auth.identity.email, "logout");
  StatusCode::NO_CONTENT
}
