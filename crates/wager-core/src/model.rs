//! Read views returned by the facade.
//!
//! Store rows hold ledgers in their stored form; views hold parsed
//! [`Ledger`]s and the related rows a caller usually wants alongside.

use std::cmp::Ordering;

use serde::Serialize;
use wager_ledger::Ledger;
use wager_store::{GameSessionRow, RoundRow, SessionRow, Tables, Timestamp};
use wager_types::{Game, GameSessionId, RoundId, SessionId, User, UserId};

use crate::error::{WagerError, WagerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: RoundId,
    pub game_session_id: GameSessionId,
    pub sequence: u32,
    pub wager: u64,
    /// Raw credits of this round alone. Never netted.
    pub ledger: Ledger,
    pub active: bool,
}

impl Round {
    pub(crate) fn from_row(row: &RoundRow) -> WagerResult<Self> {
        Ok(Self {
            id: row.id,
            game_session_id: row.game_session_id,
            sequence: row.sequence,
            wager: row.wager,
            ledger: row.ledger.parse()?,
            active: row.active,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: GameSessionId,
    pub session_id: SessionId,
    pub game: Game,
    /// Netted aggregate of every ended round.
    pub ledger: Ledger,
    /// Newest round first.
    pub rounds: Vec<Round>,
    pub started: Timestamp,
    pub ended: Option<Timestamp>,
}

impl GameSession {
    pub(crate) fn load(tables: &Tables, row: &GameSessionRow) -> WagerResult<Self> {
        let game = tables
            .game(row.game_id)
            .cloned()
            .ok_or_else(|| WagerError::not_found(row.game_id))?;
        let rounds = tables
            .rounds_of(row.id)
            .into_iter()
            .map(Round::from_row)
            .collect::<WagerResult<Vec<_>>>()?;

        Ok(Self {
            id: row.id,
            session_id: row.session_id,
            game,
            ledger: row.ledger.parse()?,
            rounds,
            started: row.started,
            ended: row.ended,
        })
    }

    pub fn is_active(&self) -> bool {
        self.ended.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub participants: Vec<UserId>,
    pub ledger: Ledger,
    pub started: Timestamp,
    pub ended: Option<Timestamp>,
}

impl Session {
    pub(crate) fn load(tables: &Tables, row: &SessionRow) -> WagerResult<Self> {
        Ok(Self {
            id: row.id,
            participants: tables
                .participants(row.id)
                .into_iter()
                .map(|p| p.user_id)
                .collect(),
            ledger: row.ledger.parse()?,
            started: row.started,
            ended: row.ended,
        })
    }

    pub fn is_active(&self) -> bool {
        self.ended.is_none()
    }
}

/// A session with its users and every game session played in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    pub users: Vec<User>,
    pub game_sessions: Vec<GameSession>,
}

impl SessionDetail {
    pub(crate) fn load(tables: &Tables, row: &SessionRow) -> WagerResult<Self> {
        let session = Session::load(tables, row)?;
        let users = session
            .participants
            .iter()
            .filter_map(|&id| tables.user(id).cloned())
            .collect();
        let game_sessions = game_sessions_by_recency(tables, row.id)
            .into_iter()
            .map(|gs| GameSession::load(tables, gs))
            .collect::<WagerResult<Vec<_>>>()?;

        Ok(Self {
            session,
            users,
            game_sessions,
        })
    }
}

/// List order for lifecycle entities: the active one first, then ended ones
/// by end time descending. Ties go to the higher id.
pub(crate) fn by_recency(a: (Option<Timestamp>, u64), b: (Option<Timestamp>, u64)) -> Ordering {
    match (a.0, b.0) {
        (None, None) => b.1.cmp(&a.1),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(&x).then(b.1.cmp(&a.1)),
    }
}

pub(crate) fn sessions_by_recency(tables: &Tables) -> Vec<&SessionRow> {
    let mut rows: Vec<&SessionRow> = tables.sessions().collect();
    rows.sort_by(|a, b| by_recency((a.ended, a.id.get()), (b.ended, b.id.get())));
    rows
}

pub(crate) fn game_sessions_by_recency(tables: &Tables, session_id: SessionId) -> Vec<&GameSessionRow> {
    let mut rows = tables.game_sessions_of(session_id);
    rows.sort_by(|a, b| by_recency((a.ended, a.id.get()), (b.ended, b.id.get())));
    rows
}
