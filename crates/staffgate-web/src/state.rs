use std::sync::Arc;

use staffgate_core::GatekeeperChain;

use crate::auth::gate::BearerGate;
use crate::config::ServerConfig;
use crate::employee::EmployeeStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub employees: Arc<EmployeeStore>,
    /// Rate limit + bearer check applied to every request.
    pub gate: Arc<GatekeeperChain<BearerGate>>,
}
