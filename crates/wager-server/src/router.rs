use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use wager_core::Store;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all wager endpoints.
pub fn build_router<S: Store + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route(
            "/v1/users",
            get(handler::list_users::<S>).post(handler::register_user::<S>),
        )
        .route("/v1/users/:id", get(handler::get_user::<S>))
        .route(
            "/v1/games",
            get(handler::list_games::<S>).post(handler::create_game::<S>),
        )
        .route("/v1/ledger", get(handler::global_ledger::<S>))
        .route("/v1/reconcile", get(handler::reconcile::<S>))
        .route(
            "/v1/sessions",
            get(handler::list_sessions::<S>).post(handler::create_session::<S>),
        )
        .route("/v1/sessions/slim", get(handler::list_sessions_slim::<S>))
        .route("/v1/sessions/active", get(handler::has_active_session::<S>))
        .route(
            "/v1/sessions/:id",
            get(handler::get_session::<S>).delete(handler::cancel_session::<S>),
        )
        .route("/v1/sessions/:id/end", post(handler::end_session::<S>))
        .route(
            "/v1/sessions/:id/game-sessions",
            get(handler::list_game_sessions::<S>),
        )
        .route(
            "/v1/sessions/:id/has-active",
            get(handler::has_active_game_session::<S>),
        )
        .route("/v1/game-sessions", post(handler::create_game_session::<S>))
        .route(
            "/v1/game-sessions/:id",
            get(handler::get_game_session::<S>).delete(handler::cancel_game_session::<S>),
        )
        .route("/v1/game-sessions/:id/new-round", post(handler::new_round::<S>))
        .route("/v1/game-sessions/:id/end-round", post(handler::end_round::<S>))
        .route("/v1/game-sessions/:id/end", post(handler::end_game_session::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
