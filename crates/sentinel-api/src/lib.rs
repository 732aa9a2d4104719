//! JSON REST API for the Sentinel registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`sentinel_core::store::RegistryStore`]. Callers authenticate with a bearer
//! token obtained from `/auth/login`; each handler declares the role it needs
//! through its extractor. TLS and listening are the caller's responsibility.

pub mod auth;
pub mod companies;
pub mod employees;
pub mod error;
pub mod session;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{delete, get, post},
};
use sentinel_core::store::RegistryStore;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use auth::PlatformAccount;
pub use error::ApiError;
pub use session::SessionTable;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionTable>,
  pub platform: Arc<PlatformAccount>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      sessions: Arc::clone(&self.sessions),
      platform: Arc::clone(&self.platform),
    }
  }
}

impl<S> AppState<S> {
  /// State with an empty session table.
  pub fn new(store: S, platform: PlatformAccount) -> Self {
    Self {
      store:    Arc::new(store),
      sessions: Arc::new(SessionTable::new()),
      platform: Arc::new(platform),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// `GET /`
async fn health() -> Json<Value> { Json(json!({ "status": "Backend running" })) }

/// Build the full API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RegistryStore + 'static,
{
  Router::new()
    .route("/", get(health))
    // Auth
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/logout", post(auth::logout::<S>))
    // Companies
    .route("/company/register", post(companies::register::<S>))
    .route("/company/requests", get(companies::requests::<S>))
    .route("/company/list", get(companies::list::<S>))
    .route("/company/all", get(companies::all::<S>))
    .route("/company/status", get(companies::own_status::<S>))
    .route("/company/approve/{id}", post(companies::approve::<S>))
    .route("/company/reject/{id}", post(companies::reject::<S>))
    .route("/company/{id}/decisions", get(companies::decisions::<S>))
    // Employees
    .route("/employee/bulk-create", post(employees::bulk_create::<S>))
    .route("/employee/list", get(employees::list::<S>))
    .route("/employee/{employee_id}", delete(employees::remove::<S>))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

#[cfg(test)]
mod tests;
