//! Async HTTP client wrapping the Sentinel REST API.

use std::{collections::HashSet, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use sentinel_core::{
  company::{Company, CompanyStatus, Registration},
  employee::{BulkOutcome, Employee, EmployeeBatch, NewEmployee},
  identity::Identity,
  lifecycle::DecisionRecord,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

/// Every way a request can fail. None of them is retried.
#[derive(Debug, Error)]
pub enum ClientError {
  /// The registry could not be reached or answered with garbage.
  #[error("could not reach the registry: {0}")]
  Transport(#[from] reqwest::Error),

  /// The registry answered with a non-2xx status.
  #[error("{detail} ({status})")]
  Api { status: StatusCode, detail: String },

  /// Refused locally; no request was sent.
  #[error("{0}")]
  Invalid(String),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Deserialize)]
pub struct Health {
  pub status: String,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
  username: &'a str,
  password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
  pub message:  String,
  pub token:    String,
  pub identity: Identity,
}

#[derive(Debug, Deserialize)]
pub struct CompanyResponse {
  pub message: String,
  pub company: Company,
}

/// Async HTTP client for the Sentinel REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      token: None,
    })
  }

  /// Attach a bearer token to every subsequent request.
  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  fn request(&self, method: Method, url: impl reqwest::IntoUrl) -> RequestBuilder {
    let req = self.client.request(method, url);
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Turn a non-2xx response into [`ClientError::Api`], reading `detail`
  /// from the body when there is one.
  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<serde_json::Value>(&body) {
      Ok(serde_json::Value::Object(map)) => match map.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => body,
      },
      _ if body.is_empty() => status.canonical_reason().unwrap_or("error").to_string(),
      _ => body,
    };
    Err(ClientError::Api { status, detail })
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = Self::check(req.send().await?).await?;
    Ok(resp.json().await?)
  }

  async fn send_empty(&self, req: RequestBuilder) -> Result<()> {
    Self::check(req.send().await?).await?;
    Ok(())
  }

  // ── Health and auth ───────────────────────────────────────────────────────

  /// `GET /`
  pub async fn health(&self) -> Result<Health> {
    self.send(self.request(Method::GET, self.url("/"))).await
  }

  /// `POST /auth/login`
  pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
    let req = self
      .request(Method::POST, self.url("/auth/login"))
      .json(&LoginBody { username, password });
    self.send(req).await
  }

  /// `POST /auth/logout`
  pub async fn logout(&self) -> Result<()> {
    self
      .send_empty(self.request(Method::POST, self.url("/auth/logout")))
      .await
  }

  // ── Companies ─────────────────────────────────────────────────────────────

  /// `POST /company/register`. The submission is validated before sending.
  pub async fn register(&self, registration: &Registration) -> Result<CompanyResponse> {
    registration
      .validate()
      .map_err(|e| ClientError::Invalid(e.to_string()))?;
    let req = self
      .request(Method::POST, self.url("/company/register"))
      .json(registration);
    self.send(req).await
  }

  /// `GET /company/requests`
  pub async fn pending_requests(&self) -> Result<Vec<Company>> {
    self
      .send(self.request(Method::GET, self.url("/company/requests")))
      .await
  }

  /// `GET /company/list`
  pub async fn active_companies(&self) -> Result<Vec<Company>> {
    self
      .send(self.request(Method::GET, self.url("/company/list")))
      .await
  }

  /// `GET /company/all[?status=<status>]`
  pub async fn all_companies(&self, status: Option<CompanyStatus>) -> Result<Vec<Company>> {
    let mut req = self.request(Method::GET, self.url("/company/all"));
    if let Some(status) = status {
      req = req.query(&[("status", status.as_ref())]);
    }
    self.send(req).await
  }

  /// Pending and active companies, fetched concurrently and merged.
  pub async fn platform_companies(&self) -> Result<Vec<Company>> {
    let (pending, active) =
      tokio::try_join!(self.pending_requests(), self.active_companies())?;
    Ok(merge_companies(pending, active))
  }

  /// `GET /company/status`
  pub async fn own_status(&self) -> Result<Company> {
    self
      .send(self.request(Method::GET, self.url("/company/status")))
      .await
  }

  /// `POST /company/approve/{id}`
  pub async fn approve(&self, id: Uuid) -> Result<CompanyResponse> {
    self
      .send(self.request(Method::POST, self.url(&format!("/company/approve/{id}"))))
      .await
  }

  /// `POST /company/reject/{id}`
  pub async fn reject(&self, id: Uuid) -> Result<CompanyResponse> {
    self
      .send(self.request(Method::POST, self.url(&format!("/company/reject/{id}"))))
      .await
  }

  /// `GET /company/{id}/decisions`
  pub async fn decisions(&self, id: Uuid) -> Result<Vec<DecisionRecord>> {
    self
      .send(self.request(Method::GET, self.url(&format!("/company/{id}/decisions"))))
      .await
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  /// `POST /employee/bulk-create`
  pub async fn bulk_create(&self, employees: Vec<NewEmployee>) -> Result<BulkOutcome> {
    let req = self
      .request(Method::POST, self.url("/employee/bulk-create"))
      .json(&EmployeeBatch { employees });
    self.send(req).await
  }

  /// `GET /employee/list`
  pub async fn list_employees(&self) -> Result<Vec<Employee>> {
    self
      .send(self.request(Method::GET, self.url("/employee/list")))
      .await
  }

  /// `DELETE /employee/{employee_id}`
  pub async fn remove_employee(&self, employee_id: &str) -> Result<()> {
    let mut url = Url::parse(&self.url("/employee"))
      .map_err(|e| ClientError::Invalid(format!("bad registry url: {e}")))?;
    url
      .path_segments_mut()
      .map_err(|()| ClientError::Invalid("registry url cannot take a path".into()))?
      .push(employee_id);
    self.send_empty(self.request(Method::DELETE, url)).await
  }
}

/// Merge the two listings, keyed by id. An id present in both means a
/// decision landed between the two reads; the decided record wins. Pending
/// records come first, then active ones, each in registry order.
pub fn merge_companies(pending: Vec<Company>, active: Vec<Company>) -> Vec<Company> {
  let decided: HashSet<Uuid> = active.iter().map(|c| c.id).collect();
  let mut seen = HashSet::new();
  pending
    .into_iter()
    .filter(|c| !decided.contains(&c.id))
    .chain(active)
    .filter(|c| seen.insert(c.id))
    .collect()
}
