//! A single settled wager.
//!
//! A round is created active with a zeroed ledger over the session's
//! participants and ends exactly once, when a winner is declared.

use tracing::debug;
use wager_ledger::Ledger;
use wager_store::{RoundRow, Tables};
use wager_types::{GameSessionId, Participant, UserId};

use crate::error::{WagerError, WagerResult};

pub struct RoundMachine;

impl RoundMachine {
    /// Insert a new active round. The store rejects a second active round in
    /// the same game session.
    pub fn create_round(
        tables: &mut Tables,
        game_session_id: GameSessionId,
        wager: u64,
        participants: &[Participant],
        sequence: u32,
    ) -> WagerResult<RoundRow> {
        let ledger = Ledger::new(participants).to_stored()?;
        let row = tables.insert_round(game_session_id, sequence, wager, ledger)?;
        debug!(game_session_id = %game_session_id, round = sequence, wager, "round started");
        Ok(row)
    }

    /// Credit `winner` on the active round's own ledger and end it.
    ///
    /// The round ledger keeps the raw credit; netting happens one level up.
    pub fn end_active_round(
        tables: &mut Tables,
        game_session_id: GameSessionId,
        winner: UserId,
    ) -> WagerResult<RoundRow> {
        let active = tables
            .active_round(game_session_id)
            .cloned()
            .ok_or(WagerError::NoActiveRound(game_session_id))?;

        let mut ledger = active.ledger.parse()?;
        ledger.credit(winner, active.wager)?;
        let row = tables.finish_round(active.id, ledger.to_stored()?)?;

        debug!(
            game_session_id = %game_session_id,
            round = row.sequence,
            winner = %winner,
            "round ended"
        );
        Ok(row)
    }
}
