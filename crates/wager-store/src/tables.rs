//! The relational state held by every store backend.
//!
//! [`Tables`] is plain data: backends wrap it in a lock and hand a copy to
//! each transaction. All constraint checks live here so every backend
//! enforces the same rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wager_ledger::StoredLedger;
use wager_types::{
    Game, GameId, GameSessionId, Participant, ParticipantId, RoundId, SessionId, User, UserId,
};

use crate::error::{Constraint, StoreError, StoreResult};
use crate::records::{GameSessionRow, GlobalLedgerRow, RoundRow, SessionRow, Timestamp};

/// Last id handed out per table. Ids are never reused, even after deletes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct Sequences {
    users: u64,
    games: u64,
    sessions: u64,
    participants: u64,
    game_sessions: u64,
    rounds: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Every table of the wager datastore.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    users: BTreeMap<UserId, User>,
    games: BTreeMap<GameId, Game>,
    sessions: BTreeMap<SessionId, SessionRow>,
    participants: BTreeMap<ParticipantId, Participant>,
    game_sessions: BTreeMap<GameSessionId, GameSessionRow>,
    rounds: BTreeMap<RoundId, RoundRow>,
    global: Option<GlobalLedgerRow>,
    sequences: Sequences,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Users and games
    // -----------------------------------------------------------------------

    /// Insert a user. The name must already be normalized.
    pub fn insert_user(&mut self, name: String) -> StoreResult<User> {
        if self.user_by_name(&name).is_some() {
            return Err(StoreError::UniqueViolation(Constraint::UserName(name)));
        }
        let id = UserId::new(next(&mut self.sequences.users));
        let user = User { id, name };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users.values().find(|u| u.name == name)
    }

    /// All users in ascending id order.
    pub fn users(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    pub fn insert_game(&mut self, name: String) -> Game {
        let id = GameId::new(next(&mut self.sequences.games));
        let game = Game { id, name };
        self.games.insert(id, game.clone());
        game
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> + '_ {
        self.games.values()
    }

    // -----------------------------------------------------------------------
    // Sessions and participants
    // -----------------------------------------------------------------------

    /// Insert an active session. Fails if another session is active.
    pub fn insert_session(
        &mut self,
        ledger: StoredLedger,
        started: Timestamp,
    ) -> StoreResult<SessionRow> {
        if self.active_session().is_some() {
            return Err(StoreError::UniqueViolation(Constraint::ActiveSession));
        }
        let id = SessionId::new(next(&mut self.sequences.sessions));
        let row = SessionRow {
            id,
            ledger,
            started,
            ended: None,
        };
        self.sessions.insert(id, row.clone());
        Ok(row)
    }

    pub fn insert_participant(
        &mut self,
        session_id: SessionId,
        user_id: UserId,
    ) -> StoreResult<Participant> {
        if !self.sessions.contains_key(&session_id) {
            return Err(StoreError::ForeignKey {
                table: "sessions",
                id: session_id.get(),
            });
        }
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::ForeignKey {
                table: "users",
                id: user_id.get(),
            });
        }
        let duplicate = self
            .participants
            .values()
            .any(|p| p.session_id == session_id && p.user_id == user_id);
        if duplicate {
            return Err(StoreError::UniqueViolation(Constraint::Membership {
                session: session_id,
                user: user_id,
            }));
        }

        let id = ParticipantId::new(next(&mut self.sequences.participants));
        let participant = Participant {
            id,
            session_id,
            user_id,
        };
        self.participants.insert(id, participant.clone());
        Ok(participant)
    }

    /// Membership rows of a session, in join order.
    pub fn participants(&self, session_id: SessionId) -> Vec<Participant> {
        self.participants
            .values()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn session(&self, id: SessionId) -> Option<&SessionRow> {
        self.sessions.get(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &SessionRow> + '_ {
        self.sessions.values()
    }

    pub fn active_session(&self) -> Option<&SessionRow> {
        self.sessions.values().find(|s| s.is_active())
    }

    pub fn set_session_ledger(&mut self, id: SessionId, ledger: StoredLedger) -> StoreResult<()> {
        self.session_mut(id)?.ledger = ledger;
        Ok(())
    }

    pub fn end_session(&mut self, id: SessionId, at: Timestamp) -> StoreResult<()> {
        self.session_mut(id)?.ended = Some(at);
        Ok(())
    }

    /// Delete a session and its membership rows.
    ///
    /// Refused while any game session still references it.
    pub fn delete_session(&mut self, id: SessionId) -> StoreResult<SessionRow> {
        if let Some(gs) = self.game_sessions.values().find(|gs| gs.session_id == id) {
            return Err(StoreError::ForeignKey {
                table: "game_sessions",
                id: gs.id.get(),
            });
        }
        let row = self.sessions.remove(&id).ok_or(StoreError::RowNotFound {
            table: "sessions",
            id: id.get(),
        })?;
        self.participants.retain(|_, p| p.session_id != id);
        Ok(row)
    }

    fn session_mut(&mut self, id: SessionId) -> StoreResult<&mut SessionRow> {
        self.sessions.get_mut(&id).ok_or(StoreError::RowNotFound {
            table: "sessions",
            id: id.get(),
        })
    }

    // -----------------------------------------------------------------------
    // Game sessions
    // -----------------------------------------------------------------------

    /// Insert an active game session. Fails if the session already has one.
    pub fn insert_game_session(
        &mut self,
        session_id: SessionId,
        game_id: GameId,
        ledger: StoredLedger,
        started: Timestamp,
    ) -> StoreResult<GameSessionRow> {
        if !self.sessions.contains_key(&session_id) {
            return Err(StoreError::ForeignKey {
                table: "sessions",
                id: session_id.get(),
            });
        }
        if !self.games.contains_key(&game_id) {
            return Err(StoreError::ForeignKey {
                table: "games",
                id: game_id.get(),
            });
        }
        if self.active_game_session(session_id).is_some() {
            return Err(StoreError::UniqueViolation(Constraint::ActiveGameSession(
                session_id,
            )));
        }

        let id = GameSessionId::new(next(&mut self.sequences.game_sessions));
        let row = GameSessionRow {
            id,
            session_id,
            game_id,
            ledger,
            started,
            ended: None,
        };
        self.game_sessions.insert(id, row.clone());
        Ok(row)
    }

    pub fn game_session(&self, id: GameSessionId) -> Option<&GameSessionRow> {
        self.game_sessions.get(&id)
    }

    /// Game sessions of a session in ascending id order.
    pub fn game_sessions_of(&self, session_id: SessionId) -> Vec<&GameSessionRow> {
        self.game_sessions
            .values()
            .filter(|gs| gs.session_id == session_id)
            .collect()
    }

    pub fn active_game_session(&self, session_id: SessionId) -> Option<&GameSessionRow> {
        self.game_sessions
            .values()
            .find(|gs| gs.session_id == session_id && gs.is_active())
    }

    pub fn set_game_session_ledger(
        &mut self,
        id: GameSessionId,
        ledger: StoredLedger,
    ) -> StoreResult<()> {
        self.game_session_mut(id)?.ledger = ledger;
        Ok(())
    }

    pub fn end_game_session(&mut self, id: GameSessionId, at: Timestamp) -> StoreResult<()> {
        self.game_session_mut(id)?.ended = Some(at);
        Ok(())
    }

    /// Delete a game session together with its rounds.
    pub fn delete_game_session(&mut self, id: GameSessionId) -> StoreResult<GameSessionRow> {
        let row = self
            .game_sessions
            .remove(&id)
            .ok_or(StoreError::RowNotFound {
                table: "game_sessions",
                id: id.get(),
            })?;
        self.rounds.retain(|_, r| r.game_session_id != id);
        Ok(row)
    }

    fn game_session_mut(&mut self, id: GameSessionId) -> StoreResult<&mut GameSessionRow> {
        self.game_sessions
            .get_mut(&id)
            .ok_or(StoreError::RowNotFound {
                table: "game_sessions",
                id: id.get(),
            })
    }

    // -----------------------------------------------------------------------
    // Rounds
    // -----------------------------------------------------------------------

    /// Insert an active round. Fails if the game session already has one.
    pub fn insert_round(
        &mut self,
        game_session_id: GameSessionId,
        sequence: u32,
        wager: u64,
        ledger: StoredLedger,
    ) -> StoreResult<RoundRow> {
        if !self.game_sessions.contains_key(&game_session_id) {
            return Err(StoreError::ForeignKey {
                table: "game_sessions",
                id: game_session_id.get(),
            });
        }
        if self.active_round(game_session_id).is_some() {
            return Err(StoreError::UniqueViolation(Constraint::ActiveRound(
                game_session_id,
            )));
        }

        let id = RoundId::new(next(&mut self.sequences.rounds));
        let row = RoundRow {
            id,
            game_session_id,
            sequence,
            wager,
            ledger,
            active: true,
        };
        self.rounds.insert(id, row.clone());
        Ok(row)
    }

    pub fn round(&self, id: RoundId) -> Option<&RoundRow> {
        self.rounds.get(&id)
    }

    /// Rounds of a game session, highest sequence first.
    pub fn rounds_of(&self, game_session_id: GameSessionId) -> Vec<&RoundRow> {
        let mut rounds: Vec<&RoundRow> = self
            .rounds
            .values()
            .filter(|r| r.game_session_id == game_session_id)
            .collect();
        rounds.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        rounds
    }

    pub fn active_round(&self, game_session_id: GameSessionId) -> Option<&RoundRow> {
        self.rounds
            .values()
            .find(|r| r.game_session_id == game_session_id && r.active)
    }

    /// Store the settled ledger and mark the round ended.
    pub fn finish_round(&mut self, id: RoundId, ledger: StoredLedger) -> StoreResult<RoundRow> {
        let row = self.rounds.get_mut(&id).ok_or(StoreError::RowNotFound {
            table: "rounds",
            id: id.get(),
        })?;
        row.ledger = ledger;
        row.active = false;
        Ok(row.clone())
    }

    // -----------------------------------------------------------------------
    // Global ledger
    // -----------------------------------------------------------------------

    pub fn global(&self) -> Option<&GlobalLedgerRow> {
        self.global.as_ref()
    }

    pub fn set_global(&mut self, row: GlobalLedgerRow) {
        self.global = Some(row);
    }
}
