use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use staffgate_core::Rejection;

use crate::error::{self, AppError};
use crate::state::AppState;

/// Runs every request through the gatekeeper chain before routing it.
///
/// The client key is the TCP peer address from `ConnectInfo`. Forwarding
/// headers such as `X-Forwarded-For` are not consulted, so clients behind
/// one reverse proxy share a quota.
pub async fn gatekeeper(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let Some(peer) = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
    else {
        return AppError::Internal("connection peer address unavailable".to_string())
            .into_response();
    };

    let path = req.uri().path().to_owned();
    let outcome = state
        .gate
        .pass(&path, peer.ip(), req, |principal, mut req| async move {
            req.extensions_mut().insert(principal);
            next.run(req).await
        })
        .await;

    match outcome {
        Ok(response) => response,
        Err(Rejection::RateLimited(e)) => error::rate_limited(&e),
        Err(Rejection::Unauthenticated(e)) => {
            tracing::debug!("Rejected unauthenticated request from {peer} to {path}");
            e.into_response()
        }
    }
}
