//! Router tests against an in-memory SQLite store.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use rand_core::OsRng;
use sentinel_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

const ROOT_EMAIL: &str = "root@sentinel.io";
const ROOT_PASSWORD: &str = "platform-secret";
const ACME_PASSWORD: &str = "acme-password";

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let salt  = SaltString::generate(&mut OsRng);
  let hash  = Argon2::default()
    .hash_password(ROOT_PASSWORD.as_bytes(), &salt)
    .unwrap()
    .to_string();

  AppState::new(store, PlatformAccount {
    name:          "Platform Root".into(),
    email:         ROOT_EMAIL.into(),
    password_hash: hash,
  })
}

async fn send_raw(
  state:  &AppState<SqliteStore>,
  method: &str,
  uri:    &str,
  token:  Option<&str>,
  body:   Body,
) -> (StatusCode, Value) {
  let mut builder = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json");
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let resp = router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn send(
  state:  &AppState<SqliteStore>,
  method: &str,
  uri:    &str,
  token:  Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
  send_raw(state, method, uri, token, body).await
}

fn registration(name: &str, reg_no: &str) -> Value {
  let slug = name.to_lowercase();
  json!({
    "company_name":  name,
    "industry_type": "factory",
    "company_email": format!("info@{slug}.com"),
    "reg_no":        reg_no,
    "admin_name":    format!("{name} Admin"),
    "admin_email":   format!("admin@{slug}.com"),
    "contact":       "555-0100",
    "password":      ACME_PASSWORD,
  })
}

async fn login(state: &AppState<SqliteStore>, username: &str, password: &str) -> (StatusCode, Value) {
  send(
    state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "username": username, "password": password })),
  )
  .await
}

async fn root_token(state: &AppState<SqliteStore>) -> String {
  let (status, body) = login(state, ROOT_EMAIL, ROOT_PASSWORD).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  body["token"].as_str().unwrap().to_owned()
}

/// Register a company and return its id.
async fn register(state: &AppState<SqliteStore>, name: &str, reg_no: &str) -> String {
  let (status, body) =
    send(state, "POST", "/company/register", None, Some(registration(name, reg_no))).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["company"]["id"].as_str().unwrap().to_owned()
}

/// Register and approve a company, then log its admin in.
async fn active_admin_token(state: &AppState<SqliteStore>, name: &str, reg_no: &str) -> String {
  let id = register(state, name, reg_no).await;
  let root = root_token(state).await;
  let (status, _) = send(state, "POST", &format!("/company/approve/{id}"), Some(&root), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, body) = login(state, &format!("admin@{}.com", name.to_lowercase()), ACME_PASSWORD).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  body["token"].as_str().unwrap().to_owned()
}

fn ids(list: &Value) -> Vec<&str> {
  list
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["id"].as_str().unwrap())
    .collect()
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_running() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "Backend running" }));
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn acme_registration_to_approval() {
  let state = make_state().await;

  let (status, body) =
    send(&state, "POST", "/company/register", None, Some(registration("Acme", "ACME-1"))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["company"]["status"], "pending");
  assert_eq!(body["company"]["industry_type"], "factory");
  assert!(body["company"].get("password").is_none());
  let id = body["company"]["id"].as_str().unwrap().to_owned();

  // Pending admins cannot log in yet.
  let (status, body) = login(&state, "admin@acme.com", ACME_PASSWORD).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert!(body["detail"].as_str().unwrap().contains("pending approval"));

  let root = root_token(&state).await;
  let (_, pending) = send(&state, "GET", "/company/requests", Some(&root), None).await;
  assert_eq!(ids(&pending), vec![id.as_str()]);

  let (status, body) =
    send(&state, "POST", &format!("/company/approve/{id}"), Some(&root), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Company approved successfully");
  assert_eq!(body["company"]["status"], "active");
  assert_eq!(body["company"]["decided_by"], ROOT_EMAIL);

  let (_, pending) = send(&state, "GET", "/company/requests", Some(&root), None).await;
  assert!(ids(&pending).is_empty());
  let (_, active) = send(&state, "GET", "/company/list", Some(&root), None).await;
  assert_eq!(ids(&active), vec![id.as_str()]);
  assert_eq!(active[0]["status"], "active");

  let (status, body) = login(&state, "admin@acme.com", ACME_PASSWORD).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["identity"]["role"], "company_admin");
  assert_eq!(body["identity"]["company"]["reg_no"], "ACME-1");

  let token = body["token"].as_str().unwrap();
  let (status, own) = send(&state, "GET", "/company/status", Some(token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(own["id"], id.as_str());
  assert_eq!(own["status"], "active");
}

#[tokio::test]
async fn second_decision_is_a_conflict() {
  let state = make_state().await;
  let id = register(&state, "Acme", "ACME-1").await;
  let root = root_token(&state).await;

  let (status, _) = send(&state, "POST", &format!("/company/reject/{id}"), Some(&root), None).await;
  assert_eq!(status, StatusCode::OK);

  for action in ["approve", "reject"] {
    let (status, body) =
      send(&state, "POST", &format!("/company/{action}/{id}"), Some(&root), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].as_str().unwrap().contains("rejected"), "{body}");
  }

  let (_, log) = send(&state, "GET", &format!("/company/{id}/decisions"), Some(&root), None).await;
  let log = log.as_array().unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0]["decision"], "reject");
  assert_eq!(log[0]["actor"], ROOT_EMAIL);
}

#[tokio::test]
async fn rejected_admin_cannot_log_in() {
  let state = make_state().await;
  let id = register(&state, "Acme", "ACME-1").await;
  let root = root_token(&state).await;
  send(&state, "POST", &format!("/company/reject/{id}"), Some(&root), None).await;

  let (status, body) = login(&state, "admin@acme.com", ACME_PASSWORD).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert!(body["detail"].as_str().unwrap().contains("rejected"));
}

#[tokio::test]
async fn decide_unknown_or_malformed_id() {
  let state = make_state().await;
  let root = root_token(&state).await;

  let uri = format!("/company/approve/{}", uuid::Uuid::new_v4());
  let (status, body) = send(&state, "POST", &uri, Some(&root), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["detail"].is_string());

  let (status, body) = send(&state, "POST", "/company/approve/not-a-uuid", Some(&root), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["detail"].is_string());

  let uri = format!("/company/{}/decisions", uuid::Uuid::new_v4());
  let (status, _) = send(&state, "GET", &uri, Some(&root), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn all_listing_filters_by_status() {
  let state = make_state().await;
  let a = register(&state, "Alpha", "A-1").await;
  let b = register(&state, "Beta", "B-1").await;
  let root = root_token(&state).await;
  send(&state, "POST", &format!("/company/reject/{b}"), Some(&root), None).await;

  let (_, all) = send(&state, "GET", "/company/all", Some(&root), None).await;
  assert_eq!(ids(&all), vec![a.as_str(), b.as_str()]);
  let (_, all) = send(&state, "GET", "/company/all?status=all", Some(&root), None).await;
  assert_eq!(ids(&all).len(), 2);
  let (_, rejected) = send(&state, "GET", "/company/all?status=rejected", Some(&root), None).await;
  assert_eq!(ids(&rejected), vec![b.as_str()]);

  let (status, body) = send(&state, "GET", "/company/all?status=archived", Some(&root), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["detail"].as_str().unwrap().contains("archived"));
}

// ─── Registration validation ─────────────────────────────────────────────────

#[tokio::test]
async fn malformed_json_is_a_400_with_detail() {
  let state = make_state().await;
  let (status, body) =
    send_raw(&state, "POST", "/company/register", None, Body::from("{not json")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["detail"].is_string());
}

#[tokio::test]
async fn invalid_registration_is_refused() {
  let state = make_state().await;

  let mut short = registration("Acme", "ACME-1");
  short["password"] = json!("short");
  let (status, body) = send(&state, "POST", "/company/register", None, Some(short)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["detail"].as_str().unwrap().contains("password"));

  let mut bad_email = registration("Acme", "ACME-1");
  bad_email["admin_email"] = json!("not-an-email");
  let (status, _) = send(&state, "POST", "/company/register", None, Some(bad_email)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let mut bad_industry = registration("Acme", "ACME-1");
  bad_industry["industry_type"] = json!("farm");
  let (status, _) = send(&state, "POST", "/company/register", None, Some(bad_industry)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
  let state = make_state().await;
  register(&state, "Acme", "ACME-1").await;
  let (status, body) =
    send(&state, "POST", "/company/register", None, Some(registration("Acme", "ACME-1"))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["detail"].is_string());
}

#[tokio::test]
async fn platform_admin_email_cannot_register_a_company() {
  let state = make_state().await;
  let mut body = registration("Acme", "ACME-1");
  body["admin_email"] = json!(ROOT_EMAIL.to_uppercase());
  let (status, resp) = send(&state, "POST", "/company/register", None, Some(body)).await;
  assert_eq!(status, StatusCode::CONFLICT, "{resp}");
  assert!(resp["detail"].as_str().unwrap().contains("admin email"));

  let root = root_token(&state).await;
  let (_, all) = send(&state, "GET", "/company/all", Some(&root), None).await;
  assert!(ids(&all).is_empty());
  let (status, _) = login(&state, ROOT_EMAIL, ROOT_PASSWORD).await;
  assert_eq!(status, StatusCode::OK);
}

// ─── Sessions and roles ──────────────────────────────────────────────────────

#[tokio::test]
async fn bad_credentials_are_401() {
  let state = make_state().await;
  for (user, pass) in [(ROOT_EMAIL, "wrong"), ("ghost@nowhere.com", "whatever")] {
    let (status, body) = login(&state, user, pass).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid username or password");
  }
}

#[tokio::test]
async fn guarded_routes_need_a_token() {
  let state = make_state().await;
  let (status, _) = send(&state, "GET", "/company/requests", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = send(&state, "GET", "/company/requests", Some("forged"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_role_is_403() {
  let state = make_state().await;
  let company = active_admin_token(&state, "Acme", "ACME-1").await;
  let root = root_token(&state).await;

  let (status, _) = send(&state, "GET", "/company/requests", Some(&company), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let uri = format!("/company/approve/{}", uuid::Uuid::new_v4());
  let (status, _) = send(&state, "POST", &uri, Some(&company), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&state, "GET", "/employee/list", Some(&root), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&state, "GET", "/company/status", Some(&root), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_revokes_the_token() {
  let state = make_state().await;
  let root = root_token(&state).await;

  let (status, _) = send(&state, "POST", "/auth/logout", Some(&root), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&state, "GET", "/company/list", Some(&root), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(state.sessions.len().await, 0);
}

// ─── Employees ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_create_list_and_remove_employees() {
  let state = make_state().await;
  let token = active_admin_token(&state, "Acme", "ACME-1").await;

  let batch = json!({ "employees": [
    { "employee_id": "E-1", "name": "Ada", "department": "Welding", "company_reg_no": "ACME-1" },
    { "employee_id": "E-2", "name": "Bo",  "department": "Welding", "company_reg_no": "OTHER" },
    { "employee_id": "E-1", "name": "Ada", "department": "Welding", "company_reg_no": "ACME-1" },
  ]});
  let (status, outcome) =
    send(&state, "POST", "/employee/bulk-create", Some(&token), Some(batch)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(outcome["message"], "Bulk employee insertion completed");
  assert_eq!(outcome["inserted"], 1);
  assert_eq!(outcome["skipped"], 2);
  assert_eq!(outcome["errors"], json!([
    "Row 2: Company OTHER is not managed by this account",
    "Row 3: Employee already exists",
  ]));

  let (_, list) = send(&state, "GET", "/employee/list", Some(&token), None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
  assert_eq!(list[0]["compliance_status"], "unknown");

  let (status, _) = send(&state, "DELETE", "/employee/E-1", Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, body) = send(&state, "DELETE", "/employee/E-1", Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["detail"].as_str().unwrap().contains("E-1"));
}
