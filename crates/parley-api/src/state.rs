use parley_exchange::ExchangeOrchestrator;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The orchestrator keeps no per-conversation state, so a single instance
/// serves every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<ExchangeOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: ExchangeOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        }
    }
}
