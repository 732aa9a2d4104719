//! Handlers for `/company` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/company/register` | Public; 201 |
//! | `GET`  | `/company/requests` | Platform admin; pending records |
//! | `GET`  | `/company/list` | Platform admin; active records |
//! | `GET`  | `/company/all` | Platform admin; optional `?status=pending\|active\|rejected\|all` |
//! | `GET`  | `/company/status` | Company admin; the caller's own record |
//! | `POST` | `/company/approve/{id}` | Platform admin; 409 unless pending |
//! | `POST` | `/company/reject/{id}` | Platform admin; 409 unless pending |
//! | `GET`  | `/company/{id}/decisions` | Platform admin; 404 if not found |

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use rand_core::OsRng;
use sentinel_core::{
  company::{Company, CompanyStatus, Registration},
  filter::Choice,
  lifecycle::{Decision, DecisionRecord},
  store::RegistryStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  session::{CompanyAdmin, PlatformAdmin},
};

/// Body returned by registration and by both decisions.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyResponse {
  pub message: String,
  pub company: Company,
}

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /company/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<Registration>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
{
  let Json(registration) = payload?;
  registration.validate()?;
  if registration
    .profile
    .admin_email
    .trim()
    .eq_ignore_ascii_case(state.platform.email.trim())
  {
    return Err(ApiError::Conflict(
      "a company with this admin email already exists or has applied".into(),
    ));
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(registration.password.as_bytes(), &salt)
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))?
    .to_string();

  let company = state
    .store
    .register(registration.profile, password_hash)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    company_id = %company.id,
    reg_no = %company.profile.reg_no,
    "company registration submitted"
  );

  Ok((
    StatusCode::CREATED,
    Json(CompanyResponse {
      message: "Company registration submitted. Awaiting platform approval.".into(),
      company,
    }),
  ))
}

// ─── Listings ────────────────────────────────────────────────────────────────

async fn list_by_status<S>(
  state: &AppState<S>,
  status: Option<CompanyStatus>,
) -> Result<Json<Vec<Company>>, ApiError>
where
  S: RegistryStore + 'static,
{
  let companies = state
    .store
    .list_companies(status)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(companies))
}

/// `GET /company/requests`
pub async fn requests<S>(
  State(state): State<AppState<S>>,
  _admin: PlatformAdmin,
) -> Result<Json<Vec<Company>>, ApiError>
where
  S: RegistryStore + 'static,
{
  list_by_status(&state, Some(CompanyStatus::Pending)).await
}

/// `GET /company/list`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: PlatformAdmin,
) -> Result<Json<Vec<Company>>, ApiError>
where
  S: RegistryStore + 'static,
{
  list_by_status(&state, Some(CompanyStatus::Active)).await
}

#[derive(Debug, Deserialize)]
pub struct AllParams {
  pub status: Option<String>,
}

/// `GET /company/all[?status=<status>|all]`
pub async fn all<S>(
  State(state): State<AppState<S>>,
  _admin: PlatformAdmin,
  params: Result<Query<AllParams>, QueryRejection>,
) -> Result<Json<Vec<Company>>, ApiError>
where
  S: RegistryStore + 'static,
{
  let Query(params) = params?;
  let choice: Choice<CompanyStatus> = match params.status.as_deref() {
    None | Some("") => Choice::All,
    Some(raw) => raw
      .parse()
      .map_err(|_| ApiError::BadRequest(format!("unknown status: {raw:?}")))?,
  };
  let status = match choice {
    Choice::All => None,
    Choice::Only(s) => Some(s),
  };
  list_by_status(&state, status).await
}

/// `GET /company/status`
pub async fn own_status<S>(
  State(state): State<AppState<S>>,
  admin: CompanyAdmin,
) -> Result<Json<Company>, ApiError>
where
  S: RegistryStore + 'static,
{
  let id = admin.company.company_id;
  let company = state
    .store
    .get_company(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("company not found: {id}")))?;
  Ok(Json(company))
}

// ─── Decisions ───────────────────────────────────────────────────────────────

async fn decide<S>(
  state: &AppState<S>,
  admin: PlatformAdmin,
  id: Result<Path<Uuid>, PathRejection>,
  decision: Decision,
) -> Result<Json<CompanyResponse>, ApiError>
where
  S: RegistryStore + 'static,
{
  let Path(id) = id?;
  let PlatformAdmin(actor) = admin;

  let (company, record) = state
    .store
    .decide(id, decision, actor.email)
    .await
    .map_err(ApiError::from_store)
    .inspect_err(|e| tracing::warn!(company_id = %id, %decision, error = %e, "decision refused"))?;
  tracing::info!(
    company_id = %id,
    %decision,
    status = %company.status,
    actor = %record.actor,
    "company decided"
  );

  let message = match decision {
    Decision::Approve => "Company approved successfully",
    Decision::Reject => "Company rejected",
  };
  Ok(Json(CompanyResponse { message: message.into(), company }))
}

/// `POST /company/approve/{id}`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  admin: PlatformAdmin,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CompanyResponse>, ApiError>
where
  S: RegistryStore + 'static,
{
  decide(&state, admin, id, Decision::Approve).await
}

/// `POST /company/reject/{id}`
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  admin: PlatformAdmin,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CompanyResponse>, ApiError>
where
  S: RegistryStore + 'static,
{
  decide(&state, admin, id, Decision::Reject).await
}

/// `GET /company/{id}/decisions`
pub async fn decisions<S>(
  State(state): State<AppState<S>>,
  _admin: PlatformAdmin,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<DecisionRecord>>, ApiError>
where
  S: RegistryStore + 'static,
{
  let Path(id) = id?;
  if state.store.get_company(id).await.map_err(ApiError::from_store)?.is_none() {
    return Err(ApiError::NotFound(format!("company not found: {id}")));
  }
  let records = state.store.decisions(id).await.map_err(ApiError::from_store)?;
  Ok(Json(records))
}
