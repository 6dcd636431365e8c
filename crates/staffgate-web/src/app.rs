use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;
use staffgate_core::Gatekeeper;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::gate::BearerGate;
use crate::config::ServerConfig;
use crate::employee::EmployeeStore;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Starts the gatekeeper and builds the application router around it.
///
/// The returned [`Gatekeeper`] owns the window reset schedule; keep it alive
/// for as long as the router serves requests and shut it down afterwards.
pub fn start(config: ServerConfig) -> anyhow::Result<(Router, Gatekeeper<BearerGate>)> {
    let gate = BearerGate::new(
        config.auth.jwt_secret.clone(),
        config.rate_limit.auth_prefix.clone(),
    );
    let gatekeeper = Gatekeeper::start(&config.rate_limit, gate)?;

    let employees = Arc::new(EmployeeStore::seeded());
    tracing::info!("Employee store seeded with {} records", employees.len());

    let state = AppState {
        config: Arc::new(config),
        employees,
        gate: gatekeeper.chain(),
    };

    Ok((build_router(state), gatekeeper))
}

pub fn build_router(state: AppState) -> Router {
    crate::api::router()
        .layer(from_fn_with_state(
            state.clone(),
            crate::middleware::gatekeeper::gatekeeper,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
