//! One game being played within a session.
//!
//! A game session starts with round #1 already active and keeps a netted
//! aggregate of every ended round. Ending it folds the aggregate into the
//! owning session; cancelling it is only possible before a second round.

use tracing::{debug, info};
use wager_ledger::Ledger;
use wager_store::{GameSessionRow, RoundRow, Tables, Timestamp};
use wager_types::{GameId, GameSessionId, SessionId, UserId};

use crate::error::{WagerError, WagerResult};
use crate::round::RoundMachine;
use crate::session::SessionMachine;

pub struct GameSessionMachine;

impl GameSessionMachine {
    /// Insert the game session with a zeroed aggregate and start round #1.
    pub fn create(
        tables: &mut Tables,
        session_id: SessionId,
        game_id: GameId,
        wager: u64,
        now: Timestamp,
    ) -> WagerResult<GameSessionRow> {
        let participants = tables.participants(session_id);
        let aggregate = Ledger::new(&participants).to_stored()?;
        let row = tables.insert_game_session(session_id, game_id, aggregate, now)?;
        RoundMachine::create_round(tables, row.id, wager, &participants, 1)?;

        info!(session_id = %session_id, game_session_id = %row.id, game_id = %game_id, "game session started");
        Ok(row)
    }

    /// Start the next round. Its sequence follows every existing round.
    pub fn new_round(tables: &mut Tables, id: GameSessionId, wager: u64) -> WagerResult<RoundRow> {
        let row = Self::live(tables, id)?;
        let participants = tables.participants(row.session_id);
        let sequence = u32::try_from(tables.rounds_of(id).len() + 1)
            .map_err(|_| WagerError::InvalidInput(format!("{id} has too many rounds")))?;
        RoundMachine::create_round(tables, id, wager, &participants, sequence)
    }

    /// End the active round and fold its wager into the netted aggregate.
    pub fn end_round(tables: &mut Tables, id: GameSessionId, winner: UserId) -> WagerResult<RoundRow> {
        let row = Self::live(tables, id)?;
        let mut aggregate = row.ledger.parse()?;
        if !aggregate.contains(winner) {
            return Err(WagerError::WinnerNotParticipant {
                winner,
                game_session: id,
            });
        }

        let round = RoundMachine::end_active_round(tables, id, winner)?;
        aggregate.credit(winner, round.wager)?;
        aggregate.resolve();
        tables.set_game_session_ledger(id, aggregate.to_stored()?)?;
        Ok(round)
    }

    /// Mark the game session ended and absorb its aggregate into the session.
    pub fn end(tables: &mut Tables, id: GameSessionId, now: Timestamp) -> WagerResult<GameSessionRow> {
        let row = Self::live(tables, id)?;
        if tables.active_round(id).is_some() {
            return Err(WagerError::RoundActive(id));
        }

        tables.end_game_session(id, now)?;
        let participants = tables.participants(row.session_id);
        let aggregate = row.ledger.parse()?;
        SessionMachine::absorb(tables, row.session_id, &participants, &aggregate)?;

        info!(session_id = %row.session_id, game_session_id = %id, "game session ended");
        Ok(GameSessionRow {
            ended: Some(now),
            ..row
        })
    }

    /// Delete a game session that has not progressed past its first round.
    pub fn cancel(tables: &mut Tables, id: GameSessionId) -> WagerResult<GameSessionRow> {
        Self::live(tables, id)?;
        if tables.rounds_of(id).len() > 1 {
            return Err(WagerError::HasHistory(id.to_string()));
        }
        let row = tables.delete_game_session(id)?;
        debug!(game_session_id = %id, "game session cancelled");
        Ok(row)
    }

    /// Fetch a game session that has not ended.
    fn live(tables: &Tables, id: GameSessionId) -> WagerResult<GameSessionRow> {
        let row = tables
            .game_session(id)
            .cloned()
            .ok_or_else(|| WagerError::not_found(id))?;
        if !row.is_active() {
            return Err(WagerError::ended(id));
        }
        Ok(row)
    }
}
