//! Ordered admission: rate limit first, then authentication, then the
//! downstream handler.
//!
//! [`GatekeeperChain`] stops at the first stage that rejects. A request
//! turned away by the rate limiter never reaches the
//! [`AuthenticationGate`] or the handler; its only side effect is the
//! counter increment. [`Gatekeeper`] owns the chain together with the
//! [`ResetScheduler`] that clears the counters.

use std::fmt;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{GateError, GateResult};
use crate::limiter::RateLimiter;
use crate::scheduler::ResetScheduler;
use crate::store::WindowCounterStore;
use crate::traffic::GateConfig;

/// Second stage of the chain. Implemented by the transport layer.
///
/// The chain does not look inside `Error`; any failure means the request
/// stops before the downstream handler.
pub trait AuthenticationGate<R>: Send + Sync {
    type Identity: Send;
    type Error: Send;

    fn authenticate(&self, request: &R) -> Result<Self::Identity, Self::Error>;
}

/// Stage of the chain that turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RateLimit,
    Authentication,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::RateLimit => f.write_str("rate-limit"),
            Stage::Authentication => f.write_str("authentication"),
        }
    }
}

/// Terminal outcome for a request that did not make it downstream.
#[derive(Debug)]
pub enum Rejection<E> {
    /// Over quota. Rendered as 429 with the error's message.
    RateLimited(GateError),
    /// The gate's own failure, passed through unchanged.
    Unauthenticated(E),
}

impl<E> Rejection<E> {
    pub fn stage(&self) -> Stage {
        match self {
            Rejection::RateLimited(_) => Stage::RateLimit,
            Rejection::Unauthenticated(_) => Stage::Authentication,
        }
    }
}

pub struct GatekeeperChain<A> {
    limiter: RateLimiter,
    auth: A,
}

impl<A> GatekeeperChain<A> {
    pub fn new(limiter: RateLimiter, auth: A) -> Self {
        Self { limiter, auth }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Runs the rate limit and authentication stages.
    pub fn check<R>(
        &self,
        path: &str,
        client: IpAddr,
        request: &R,
    ) -> Result<A::Identity, Rejection<A::Error>>
    where
        A: AuthenticationGate<R>,
    {
        let admission = self
            .limiter
            .decide(path, client)
            .map_err(Rejection::RateLimited)?;

        let identity = self
            .auth
            .authenticate(request)
            .map_err(Rejection::Unauthenticated)?;

        debug!(%client, class = %admission.class, path, "request admitted");
        Ok(identity)
    }

    /// Runs every stage and hands the untouched request to `downstream`
    /// once both gates pass.
    pub async fn pass<R, F, Fut, T>(
        &self,
        path: &str,
        client: IpAddr,
        request: R,
        downstream: F,
    ) -> Result<T, Rejection<A::Error>>
    where
        A: AuthenticationGate<R>,
        F: FnOnce(A::Identity, R) -> Fut,
        Fut: Future<Output = T>,
    {
        let identity = self.check(path, client, &request)?;
        Ok(downstream(identity, request).await)
    }
}

/// Owns the counter store, the chain built on it and the reset schedule.
///
/// The schedule starts in [`start`](Self::start) and ends in
/// [`shutdown`](Self::shutdown), or when the gatekeeper is dropped.
pub struct Gatekeeper<A> {
    chain: Arc<GatekeeperChain<A>>,
    store: Arc<WindowCounterStore>,
    scheduler: ResetScheduler,
}

impl<A> Gatekeeper<A> {
    /// Validates `config`, builds the chain and starts the reset schedule.
    ///
    /// Nothing is spawned when validation fails. Must be called from within
    /// a tokio runtime.
    pub fn start(config: &GateConfig, auth: A) -> GateResult<Self> {
        config.validate()?;

        let store = Arc::new(WindowCounterStore::new());
        let limiter = RateLimiter::new(Arc::clone(&store), config.clone());
        let chain = Arc::new(GatekeeperChain::new(limiter, auth));
        let scheduler = ResetScheduler::start(Arc::clone(&store), config.window());

        info!(
            auth_prefix = %config.auth_prefix,
            auth_limit = config.auth_requests_per_window,
            general_limit = config.general_requests_per_window,
            window_secs = config.window_secs,
            "gatekeeper started"
        );

        Ok(Self {
            chain,
            store,
            scheduler,
        })
    }

    pub fn chain(&self) -> Arc<GatekeeperChain<A>> {
        Arc::clone(&self.chain)
    }

    pub fn store(&self) -> &Arc<WindowCounterStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &ResetScheduler {
        &self.scheduler
    }

    /// Stops the reset schedule. Evaluations already running on other
    /// handles to the chain finish normally.
    pub async fn shutdown(self) {
        self.scheduler.stop().await;
        info!("gatekeeper stopped");
    }
}
