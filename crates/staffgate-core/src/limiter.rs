//! Fixed-window rate limiter keyed by client address and traffic class.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{GateError, GateResult};
use crate::store::WindowCounterStore;
use crate::traffic::{GateConfig, TrafficClass};

/// A request that fit within its class ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub class: TrafficClass,
    /// Requests counted for this client and class in the current window,
    /// this one included.
    pub count: u64,
    pub ceiling: u64,
}

impl Admission {
    pub fn remaining(&self) -> u64 {
        self.ceiling.saturating_sub(self.count)
    }
}

/// Classifies requests, counts them and decides admit or reject.
///
/// Every call to [`decide`](Self::decide) is counted, including rejected
/// ones, so a client stays rejected until the store is cleared.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<WindowCounterStore>,
    config: GateConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<WindowCounterStore>, config: GateConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<WindowCounterStore> {
        &self.store
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn decide(&self, path: &str, client: IpAddr) -> GateResult<Admission> {
        let class = self.config.classify(path);
        let ceiling = self.config.ceiling(class);
        let count = self.store.increment(class, client);

        if count > ceiling {
            warn!(%client, %class, count, ceiling, path, "rate limit exceeded");
            return Err(GateError::RateLimitExceeded(class));
        }

        debug!(%client, %class, count, ceiling, "request admitted by rate limiter");
        Ok(Admission {
            class,
            count,
            ceiling,
        })
    }
}
