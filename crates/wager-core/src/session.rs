//! A meetup: a fixed set of participants and the game sessions they play.

use tracing::{debug, info};
use wager_ledger::Ledger;
use wager_store::{SessionRow, Tables, Timestamp};
use wager_types::{Participant, SessionId, UserId};

use crate::error::{WagerError, WagerResult};
use crate::global::GlobalLedger;

pub struct SessionMachine;

impl SessionMachine {
    /// Insert an active session and one membership row per participant.
    ///
    /// Participant ids are expected to be distinct registered users; the
    /// store still rejects duplicates and unknown ids.
    pub fn create(
        tables: &mut Tables,
        participant_ids: &[UserId],
        now: Timestamp,
    ) -> WagerResult<SessionRow> {
        let aggregate = Ledger::new(participant_ids).to_stored()?;
        let row = tables.insert_session(aggregate, now)?;
        for &user_id in participant_ids {
            tables.insert_participant(row.id, user_id)?;
        }
        info!(session_id = %row.id, participants = participant_ids.len(), "session started");
        Ok(row)
    }

    /// Fold a game session's final aggregate into the session ledger.
    pub fn absorb(
        tables: &mut Tables,
        session_id: SessionId,
        participants: &[Participant],
        incoming: &Ledger,
    ) -> WagerResult<Ledger> {
        let current = tables
            .session(session_id)
            .ok_or_else(|| WagerError::not_found(session_id))?
            .ledger
            .parse()?;
        let mut merged = Ledger::merge(participants, [&current, incoming])?;
        merged.resolve();
        tables.set_session_ledger(session_id, merged.to_stored()?)?;
        debug!(session_id = %session_id, "game session absorbed");
        Ok(merged)
    }

    /// Push the session aggregate into the global ledger and mark it ended.
    pub fn end(tables: &mut Tables, id: SessionId, now: Timestamp) -> WagerResult<SessionRow> {
        let row = Self::live(tables, id)?;
        if tables.active_game_session(id).is_some() {
            return Err(WagerError::GameSessionActive(id));
        }

        GlobalLedger::update(tables, &row.ledger.parse()?, now)?;
        tables.end_session(id, now)?;

        info!(session_id = %id, "session ended");
        Ok(SessionRow {
            ended: Some(now),
            ..row
        })
    }

    /// Delete a session nobody has played in yet.
    pub fn cancel(tables: &mut Tables, id: SessionId) -> WagerResult<SessionRow> {
        Self::live(tables, id)?;
        if tables.active_game_session(id).is_some() {
            return Err(WagerError::GameSessionActive(id));
        }
        if !tables.game_sessions_of(id).is_empty() {
            return Err(WagerError::HasHistory(id.to_string()));
        }
        let row = tables.delete_session(id)?;
        debug!(session_id = %id, "session cancelled");
        Ok(row)
    }

    fn live(tables: &Tables, id: SessionId) -> WagerResult<SessionRow> {
        let row = tables
            .session(id)
            .cloned()
            .ok_or_else(|| WagerError::not_found(id))?;
        if !row.is_active() {
            return Err(WagerError::ended(id));
        }
        Ok(row)
    }
}
