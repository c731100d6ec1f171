//! HTTP server for wager.
//!
//! A thin JSON shell over [`wager_core::Wager`]: request binding, pagination
//! bounds, and error-to-status mapping. No ledger logic lives here.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorBody, ServerError, ServerResult};
pub use handler::HealthResponse;
pub use server::WagerServer;
pub use state::AppState;
