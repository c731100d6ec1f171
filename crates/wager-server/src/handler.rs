use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use wager_core::{
    Game, GameId, GameSession, GameSessionId, Ledger, ReconcileReport, Session, SessionDetail,
    SessionId, Store, User, UserId, Wager, WagerResult,
};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

type JsonBody<T> = Result<Json<T>, JsonRejection>;
type Id<T> = Result<Path<T>, PathRejection>;
type PageParams = Result<Query<PageQuery>, QueryRejection>;

/// Run a mutation on the blocking pool. Each one holds the store's write lock
/// and, for the file backend, syncs the snapshot to disk.
async fn write<S, T, F>(state: &AppState<S>, f: F) -> ServerResult<T>
where
    S: Store + 'static,
    T: Send + 'static,
    F: FnOnce(&Wager<S>) -> WagerResult<T> + Send + 'static,
{
    let wager = Arc::clone(&state.wager);
    let result = tokio::task::spawn_blocking(move || f(&wager))
        .await
        .map_err(|e| ServerError::Internal(format!("write task failed: {e}")))?;
    Ok(result?)
}

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub users: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameSessionRequest {
    pub session_id: SessionId,
    pub game_id: GameId,
    pub wager: u64,
}

#[derive(Debug, Deserialize)]
pub struct NewRoundRequest {
    pub wager: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndRoundRequest {
    pub winner_id: UserId,
}

// ---------------------------------------------------------------------------
// Health, users, games, ledger
// ---------------------------------------------------------------------------

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_users<S: Store>(State(state): State<AppState<S>>) -> ServerResult<Json<Vec<User>>> {
    Ok(Json(state.wager.users()?))
}

pub async fn register_user<S: Store + 'static>(
    State(state): State<AppState<S>>,
    body: JsonBody<NameRequest>,
) -> ServerResult<(StatusCode, Json<User>)> {
    let Json(req) = body?;
    let user = write(&state, move |w| w.register_user(&req.name)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user<S: Store>(
    State(state): State<AppState<S>>,
    id: Id<UserId>,
) -> ServerResult<Json<User>> {
    let Path(id) = id?;
    Ok(Json(state.wager.user(id)?))
}

pub async fn list_games<S: Store>(
    State(state): State<AppState<S>>,
    query: PageParams,
) -> ServerResult<Json<Vec<Game>>> {
    let Query(q) = query?;
    let page = state.config.page(q.limit, q.offset)?;
    Ok(Json(state.wager.games(page)?))
}

pub async fn create_game<S: Store + 'static>(
    State(state): State<AppState<S>>,
    body: JsonBody<NameRequest>,
) -> ServerResult<(StatusCode, Json<Game>)> {
    let Json(req) = body?;
    let game = write(&state, move |w| w.create_game(&req.name)).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn global_ledger<S: Store + 'static>(
    State(state): State<AppState<S>>,
) -> ServerResult<Json<Ledger>> {
    // The first read creates the row.
    Ok(Json(write(&state, |w| w.current_global_ledger()).await?))
}

pub async fn reconcile<S: Store>(
    State(state): State<AppState<S>>,
) -> ServerResult<Json<ReconcileReport>> {
    Ok(Json(state.wager.reconcile()?))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub async fn list_sessions<S: Store>(
    State(state): State<AppState<S>>,
    query: PageParams,
) -> ServerResult<Json<Vec<SessionDetail>>> {
    let Query(q) = query?;
    let page = state.config.page(q.limit, q.offset)?;
    Ok(Json(state.wager.sessions_with_game_sessions(page)?))
}

/// Sessions without their users and game sessions.
pub async fn list_sessions_slim<S: Store>(
    State(state): State<AppState<S>>,
    query: PageParams,
) -> ServerResult<Json<Vec<Session>>> {
    let Query(q) = query?;
    let page = state.config.page(q.limit, q.offset)?;
    Ok(Json(state.wager.sessions(page)?))
}

pub async fn create_session<S: Store + 'static>(
    State(state): State<AppState<S>>,
    body: JsonBody<NewSessionRequest>,
) -> ServerResult<(StatusCode, Json<Session>)> {
    let Json(req) = body?;
    let session = write(&state, move |w| w.create_session(&req.users)).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn has_active_session<S: Store>(State(state): State<AppState<S>>) -> ServerResult<Json<bool>> {
    Ok(Json(state.wager.has_active_session()?))
}

pub async fn get_session<S: Store>(
    State(state): State<AppState<S>>,
    id: Id<SessionId>,
) -> ServerResult<Json<SessionDetail>> {
    let Path(id) = id?;
    Ok(Json(state.wager.session_detail(id)?))
}

pub async fn cancel_session<S: Store + 'static>(
    State(state): State<AppState<S>>,
    id: Id<SessionId>,
) -> ServerResult<StatusCode> {
    let Path(id) = id?;
    write(&state, move |w| w.cancel_session(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn end_session<S: Store + 'static>(
    State(state): State<AppState<S>>,
    id: Id<SessionId>,
) -> ServerResult<Json<Session>> {
    let Path(id) = id?;
    Ok(Json(write(&state, move |w| w.end_session(id)).await?))
}

pub async fn list_game_sessions<S: Store>(
    State(state): State<AppState<S>>,
    id: Id<SessionId>,
    query: PageParams,
) -> ServerResult<Json<Vec<GameSession>>> {
    let Path(id) = id?;
    let Query(q) = query?;
    let page = state.config.page(q.limit, q.offset)?;
    Ok(Json(state.wager.game_sessions(id, page)?))
}

pub async fn has_active_game_session<S: Store>(
    State(state): State<AppState<S>>,
    id: Id<SessionId>,
) -> ServerResult<Json<bool>> {
    let Path(id) = id?;
    Ok(Json(state.wager.has_active_game_session(id)?))
}

// ---------------------------------------------------------------------------
// Game sessions
// ---------------------------------------------------------------------------

pub async fn create_game_session<S: Store + 'static>(
    State(state): State<AppState<S>>,
    body: JsonBody<NewGameSessionRequest>,
) -> ServerResult<(StatusCode, Json<GameSession>)> {
    let Json(req) = body?;
    let gs = write(&state, move |w| {
        w.create_game_session(req.session_id, req.game_id, req.wager)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(gs)))
}

pub async fn get_game_session<S: Store>(
    State(state): State<AppState<S>>,
    id: Id<GameSessionId>,
) -> ServerResult<Json<GameSession>> {
    let Path(id) = id?;
    Ok(Json(state.wager.game_session(id)?))
}

pub async fn cancel_game_session<S: Store + 'static>(
    State(state): State<AppState<S>>,
    id: Id<GameSessionId>,
) -> ServerResult<StatusCode> {
    let Path(id) = id?;
    write(&state, move |w| w.cancel_game_session(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn new_round<S: Store + 'static>(
    State(state): State<AppState<S>>,
    id: Id<GameSessionId>,
    body: JsonBody<NewRoundRequest>,
) -> ServerResult<Json<GameSession>> {
    let Path(id) = id?;
    let Json(req) = body?;
    Ok(Json(write(&state, move |w| w.new_round(id, req.wager)).await?))
}

pub async fn end_round<S: Store + 'static>(
    State(state): State<AppState<S>>,
    id: Id<GameSessionId>,
    body: JsonBody<EndRoundRequest>,
) -> ServerResult<Json<GameSession>> {
    let Path(id) = id?;
    let Json(req) = body?;
    Ok(Json(write(&state, move |w| w.end_round(id, req.winner_id)).await?))
}

pub async fn end_game_session<S: Store + 'static>(
    State(state): State<AppState<S>>,
    id: Id<GameSessionId>,
) -> ServerResult<Json<GameSession>> {
    let Path(id) = id?;
    Ok(Json(write(&state, move |w| w.end_game_session(id)).await?))
}
