//! Error types for `staffgate-core`.
//!
//! Fallible gate operations return [`GateResult<T>`], an alias for
//! `Result<T, GateError>`.

use crate::traffic::TrafficClass;

/// Unified error type for the admission pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The client used up its quota for this traffic class in the current window.
    ///
    /// The display text is the message sent back to the client.
    #[error("{}", .0.rejection_message())]
    RateLimitExceeded(TrafficClass),

    /// A scheduled window reset failed. Logged; the schedule keeps running.
    #[error("scheduler tick failed: {0}")]
    SchedulerTick(String),

    /// The gate configuration cannot be used.
    #[error("invalid gate config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout `staffgate-core`.
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_limit_displays_client_message() {
        let err = GateError::RateLimitExceeded(TrafficClass::Authentication);
        assert_eq!(
            err.to_string(),
            "Too many login attempts. Please try again later."
        );
    }

    #[test]
    fn api_limit_displays_client_message() {
        let err = GateError::RateLimitExceeded(TrafficClass::General);
        assert_eq!(
            err.to_string(),
            "Too many API requests. Please try again later."
        );
    }

    #[test]
    fn scheduler_tick_displays_cause() {
        let err = GateError::SchedulerTick("store poisoned".to_string());
        assert_eq!(err.to_string(), "scheduler tick failed: store poisoned");
    }

    #[test]
    fn invalid_config_displays_message() {
        let err = GateError::InvalidConfig("window_secs must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid gate config: window_secs must be positive"
        );
    }

    #[test]
    fn gate_result_err() {
        let result: GateResult<u64> = Err(GateError::RateLimitExceeded(TrafficClass::General));
        assert!(matches!(
            result,
            Err(GateError::RateLimitExceeded(TrafficClass::General))
        ));
    }
}
