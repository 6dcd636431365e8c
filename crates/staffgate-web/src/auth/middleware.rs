use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::gate::Principal;
use crate::error::AppError;

/// Authenticated caller, as established by the gatekeeper chain.
pub struct AuthUser {
    pub sub: String,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::User(sub)) => Ok(AuthUser { sub: sub.clone() }),
            _ => Err(AppError::Auth("Authentication required".to_string())),
        }
    }
}
