mod auth_handlers;
pub mod employees;

use axum::routing::{get, post};
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/login", post(auth_handlers::login))
        .route(
            "/api/v1/employee",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route("/api/v1/employee/{uuid}", get(employees::get_employee))
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}
