//! Traffic classes and the per-class quota policy.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GateError, GateResult};

/// Bucket a request is counted in. Each class carries its own ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficClass {
    /// Requests to the login endpoints.
    Authentication,
    /// Everything else.
    General,
}

impl TrafficClass {
    /// Classifies a request path with a plain prefix test.
    ///
    /// The path structure is not parsed: anything beginning with
    /// `auth_prefix`, including unknown sub-paths, is [`TrafficClass::Authentication`].
    pub fn classify(path: &str, auth_prefix: &str) -> Self {
        if path.starts_with(auth_prefix) {
            TrafficClass::Authentication
        } else {
            TrafficClass::General
        }
    }

    /// Body sent with the 429 response for this class.
    pub fn rejection_message(self) -> &'static str {
        match self {
            TrafficClass::Authentication => "Too many login attempts. Please try again later.",
            TrafficClass::General => "Too many API requests. Please try again later.",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficClass::Authentication => f.write_str("authentication"),
            TrafficClass::General => f.write_str("general"),
        }
    }
}

/// Rate limit policy: which paths are login traffic, the two ceilings and
/// the length of the fixed window.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_auth_prefix")]
    pub auth_prefix: String,
    #[serde(default = "default_auth_rpw")]
    pub auth_requests_per_window: u64,
    #[serde(default = "default_general_rpw")]
    pub general_requests_per_window: u64,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_auth_prefix() -> String {
    "/api/v1/auth/".to_string()
}
fn default_auth_rpw() -> u64 { 5 }
fn default_general_rpw() -> u64 { 30 }
fn default_window_secs() -> u64 { 60 }

/// Longest accepted window. Longer periods cannot be scheduled on the
/// runtime clock.
pub const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            auth_prefix: default_auth_prefix(),
            auth_requests_per_window: default_auth_rpw(),
            general_requests_per_window: default_general_rpw(),
            window_secs: default_window_secs(),
        }
    }
}

impl GateConfig {
    /// Maximum admitted requests per window for `class`.
    pub fn ceiling(&self, class: TrafficClass) -> u64 {
        match class {
            TrafficClass::Authentication => self.auth_requests_per_window,
            TrafficClass::General => self.general_requests_per_window,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn classify(&self, path: &str) -> TrafficClass {
        TrafficClass::classify(path, &self.auth_prefix)
    }

    /// Rejects policies the gate cannot run with.
    pub fn validate(&self) -> GateResult<()> {
        if self.auth_prefix.is_empty() {
            return Err(GateError::InvalidConfig(
                "auth_prefix must not be empty".to_string(),
            ));
        }
        if self.auth_requests_per_window == 0 || self.general_requests_per_window == 0 {
            return Err(GateError::InvalidConfig(
                "requests per window must be at least 1".to_string(),
            ));
        }
        if self.window_secs == 0 {
            return Err(GateError::InvalidConfig(
                "window_secs must be positive".to_string(),
            ));
        }
        if self.window_secs > MAX_WINDOW_SECS {
            return Err(GateError::InvalidConfig(format!(
                "window_secs must be at most {MAX_WINDOW_SECS}"
            )));
        }
        Ok(())
    }
}
