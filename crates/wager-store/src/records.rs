use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wager_ledger::StoredLedger;
use wager_types::{GameId, GameSessionId, RoundId, SessionId};

/// All store timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// A session row. `ended == None` means active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: SessionId,
    pub ledger: StoredLedger,
    pub started: Timestamp,
    pub ended: Option<Timestamp>,
}

impl SessionRow {
    pub fn is_active(&self) -> bool {
        self.ended.is_none()
    }
}

/// A game session row. `ended == None` means active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSessionRow {
    pub id: GameSessionId,
    pub session_id: SessionId,
    pub game_id: GameId,
    pub ledger: StoredLedger,
    pub started: Timestamp,
    pub ended: Option<Timestamp>,
}

impl GameSessionRow {
    pub fn is_active(&self) -> bool {
        self.ended.is_none()
    }
}

/// A round row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRow {
    pub id: RoundId,
    pub game_session_id: GameSessionId,
    /// 1-based position within the game session.
    pub sequence: u32,
    pub wager: u64,
    pub ledger: StoredLedger,
    pub active: bool,
}

/// The singleton global ledger row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalLedgerRow {
    pub ledger: StoredLedger,
    pub updated: Timestamp,
}
