use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::auth::{jwt, password};
use crate::dto::{LoginRequest, LoginResponse};
use crate::error::AppError;
use crate::state::AppState;

fn invalid_credentials() -> AppError {
    AppError::Auth("Invalid username or password".to_string())
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(body) = payload?;
    let Some(user) = state.config.find_user(&body.username).cloned() else {
        tracing::warn!("Failed login attempt for unknown user: {}", body.username);
        return Err(invalid_credentials());
    };

    let hash = user.password_hash;
    let candidate = body.password;
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&hash, &candidate))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    if !valid {
        tracing::warn!("Failed login attempt for user: {}", user.username);
        return Err(invalid_credentials());
    }

    let token = jwt::create_token(
        &state.config.auth.jwt_secret,
        state.config.auth.jwt_ttl_hours,
        &user.username,
    )?;

    tracing::info!("Login succeeded for user: {}", user.username);
    Ok(Json(LoginResponse { token }))
}
