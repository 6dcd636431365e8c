//! Per-class request counters keyed by client address.

use std::net::IpAddr;

use dashmap::DashMap;

use crate::traffic::TrafficClass;

/// Request counters for the current window, one map per [`TrafficClass`].
///
/// Counters are created on first use and only ever incremented until the
/// next [`clear`](Self::clear). Each increment runs under the lock of the
/// shard holding its key, so callers on other clients do not contend.
#[derive(Debug, Default)]
pub struct WindowCounterStore {
    authentication: DashMap<IpAddr, u64>,
    general: DashMap<IpAddr, u64>,
}

impl WindowCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self, class: TrafficClass) -> &DashMap<IpAddr, u64> {
        match class {
            TrafficClass::Authentication => &self.authentication,
            TrafficClass::General => &self.general,
        }
    }

    /// Counts one request and returns the count including it.
    ///
    /// Insert-if-absent and the increment happen under one shard lock, so
    /// concurrent first requests from the same client never overwrite each
    /// other.
    pub fn increment(&self, class: TrafficClass, client: IpAddr) -> u64 {
        let mut count = self.counters(class).entry(client).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count without recording a request. Absent clients read as 0.
    pub fn count(&self, class: TrafficClass, client: IpAddr) -> u64 {
        self.counters(class)
            .get(&client)
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Number of clients with a live counter in `class`.
    pub fn tracked_clients(&self, class: TrafficClass) -> usize {
        self.counters(class).len()
    }

    /// Drops every counter in both classes.
    ///
    /// Each shard is cleared under its write lock: an increment racing the
    /// clear either lands before its shard is wiped or starts again from 1.
    pub fn clear(&self) {
        self.authentication.clear();
        self.general.clear();
    }
}
