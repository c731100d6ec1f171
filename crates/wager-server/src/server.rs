use tokio::net::TcpListener;
use wager_core::{Store, Wager};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Wager HTTP server over any [`Store`] backend.
pub struct WagerServer<S> {
    state: AppState<S>,
}

impl<S: Store + 'static> WagerServer<S> {
    pub fn new(config: ServerConfig, wager: Wager<S>) -> Self {
        Self {
            state: AppState::new(wager, config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let addr = self.state.config.bind_addr;
        let app = build_router(self.state);
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "wager server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use wager_core::InMemoryStore;

    use super::*;

    #[test]
    fn server_construction() {
        let server = WagerServer::new(ServerConfig::default(), Wager::new(InMemoryStore::new()));
        assert_eq!(server.config().bind_addr.port(), 8080);
        let _router = server.router();
    }
}
