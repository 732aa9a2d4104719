//! Handlers for `/employee` endpoints. All are scoped to the caller's company.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/employee/bulk-create` | Body: `{"employees":[…]}` |
//! | `GET`    | `/employee/list` | |
//! | `DELETE` | `/employee/{employee_id}` | 204; 404 if not found |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
};
use sentinel_core::{
  employee::{BulkOutcome, Employee, EmployeeBatch},
  store::RegistryStore,
};

use crate::{AppState, error::ApiError, session::CompanyAdmin};

/// `POST /employee/bulk-create`
pub async fn bulk_create<S>(
  State(state): State<AppState<S>>,
  admin: CompanyAdmin,
  payload: Result<Json<EmployeeBatch>, JsonRejection>,
) -> Result<Json<BulkOutcome>, ApiError>
where
  S: RegistryStore + 'static,
{
  let Json(batch) = payload?;
  let outcome = state
    .store
    .bulk_create_employees(admin.company.reg_no.clone(), batch.employees)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    reg_no = %admin.company.reg_no,
    inserted = outcome.inserted,
    skipped = outcome.skipped,
    "bulk employee import"
  );
  Ok(Json(outcome))
}

/// `GET /employee/list`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  admin: CompanyAdmin,
) -> Result<Json<Vec<Employee>>, ApiError>
where
  S: RegistryStore + 'static,
{
  let employees = state
    .store
    .list_employees(admin.company.reg_no)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(employees))
}

/// `DELETE /employee/{employee_id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  admin: CompanyAdmin,
  employee_id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore + 'static,
{
  let Path(employee_id) = employee_id?;
  state
    .store
    .remove_employee(admin.company.reg_no, employee_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
