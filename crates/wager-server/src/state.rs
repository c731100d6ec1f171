use std::sync::Arc;

use wager_core::Wager;

use crate::config::ServerConfig;

/// Shared handler state.
pub struct AppState<S> {
    pub wager: Arc<Wager<S>>,
    pub config: Arc<ServerConfig>,
}

impl<S> AppState<S> {
    pub fn new(wager: Wager<S>, config: ServerConfig) -> Self {
        Self {
            wager: Arc::new(wager),
            config: Arc::new(config),
        }
    }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            wager: Arc::clone(&self.wager),
            config: Arc::clone(&self.config),
        }
    }
}
