//! Staffgate core library: request admission ahead of business logic.
//!
//! Every request passes two gates in a fixed order. A fixed-window rate
//! limiter counts requests per client address and traffic class; requests
//! within quota then go through an [`AuthenticationGate`] supplied by the
//! transport layer. The library holds no global state: each [`Gatekeeper`]
//! owns its counters and the timer that resets them.
//!
//! # Modules
//!
//! - [`traffic`] — [`TrafficClass`] and the quota policy ([`GateConfig`]).
//! - [`store`] — [`WindowCounterStore`], the per-class counters.
//! - [`scheduler`] — [`ResetScheduler`], the periodic window reset.
//! - [`limiter`] — [`RateLimiter`], classification and admit/reject.
//! - [`chain`] — [`GatekeeperChain`] and the [`Gatekeeper`] lifecycle.
//! - [`error`] — [`GateError`] and [`GateResult`].

pub mod chain;
pub mod error;
pub mod limiter;
pub mod scheduler;
pub mod store;
pub mod traffic;

pub use chain::{AuthenticationGate, Gatekeeper, GatekeeperChain, Rejection, Stage};
pub use error::{GateError, GateResult};
pub use limiter::{Admission, RateLimiter};
pub use scheduler::{ResetScheduler, WindowReset};
pub use store::WindowCounterStore;
pub use traffic::{GateConfig, TrafficClass, MAX_WINDOW_SECS};
