use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::dto::EmployeeRequest;
use crate::employee::Employee;
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::validate_employee;

pub async fn list_employees(_user: AuthUser, State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.employees.all())
}

pub async fn get_employee(
    _user: AuthUser,
    State(state): State<AppState>,
    uuid: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Employee>, AppError> {
    let Path(uuid) = uuid?;
    state
        .employees
        .get(&uuid)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))
}

pub async fn create_employee(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let Json(body) = payload?;
    let employee = validate_employee(&body, chrono::Utc::now())?;
    let created = state.employees.insert(employee);
    tracing::info!("Employee {} created by {}", created.uuid, user.sub);
    Ok((StatusCode::CREATED, Json(created)))
}
