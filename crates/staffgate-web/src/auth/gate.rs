//! Bearer-token check run as the second stage of the gatekeeper chain.

use axum::body::Body;
use axum::http::{header, Request};
use staffgate_core::AuthenticationGate;

use crate::error::AppError;

/// Who the chain let through. Stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Request to a public path (login); no token was required.
    Anonymous,
    User(String),
}

/// Lets every path under `public_prefix` through and requires a valid
/// `Authorization: Bearer <jwt>` everywhere else.
pub struct BearerGate {
    jwt_secret: String,
    public_prefix: String,
}

impl BearerGate {
    pub fn new(jwt_secret: impl Into<String>, public_prefix: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            public_prefix: public_prefix.into(),
        }
    }
}

impl AuthenticationGate<Request<Body>> for BearerGate {
    type Identity = Principal;
    type Error = AppError;

    fn authenticate(&self, request: &Request<Body>) -> Result<Principal, AppError> {
        if request.uri().path().starts_with(&self.public_prefix) {
            return Ok(Principal::Anonymous);
        }

        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

        let claims = super::jwt::verify_token(&self.jwt_secret, token)
            .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))?;

        Ok(Principal::User(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn gate() -> BearerGate {
        BearerGate::new(SECRET, "/api/v1/auth/")
    }

    fn request(path: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn login_path_is_public() {
        let principal = gate()
            .authenticate(&request("/api/v1/auth/login", None))
            .unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = gate()
            .authenticate(&request("/api/v1/employee", None))
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(msg) if msg == "Missing authorization header"));
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let err = gate()
            .authenticate(&request("/api/v1/employee", Some("Basic YWRtaW46YWRtaW4=")))
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(msg) if msg == "Invalid authorization header format"));
    }

    #[test]
    fn valid_token_yields_user() {
        let token = jwt::create_token(SECRET, 1, "admin").unwrap();
        let principal = gate()
            .authenticate(&request(
                "/api/v1/employee",
                Some(&format!("Bearer {token}")),
            ))
            .unwrap();
        assert_eq!(principal, Principal::User("admin".to_string()));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = jwt::create_token(SECRET, 1, "admin").unwrap();
        let err = gate()
            .authenticate(&request(
                "/api/v1/employee",
                Some(&format!("Bearer {token}x")),
            ))
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(msg) if msg == "Invalid or expired token"));
    }
}
