use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;
use wager_ledger::Ledger;
use wager_store::{SessionRow, Store, Tables};
use wager_types::{Game, GameId, GameSessionId, Page, Participant, RoundId, SessionId, User, UserId};

use crate::error::{WagerError, WagerResult};
use crate::game_session::GameSessionMachine;
use crate::global::GlobalLedger;
use crate::model::{
    game_sessions_by_recency, sessions_by_recency, GameSession, Round, Session, SessionDetail,
};
use crate::reconcile::{self, ReconcileReport};
use crate::session::SessionMachine;
use crate::users;

/// High-level wager API over a shared [`Store`].
///
/// Every mutating call runs as one store transaction, so a multi-level
/// sequence (end round + aggregate, end game session + absorb, end session +
/// global update) either lands completely or not at all.
pub struct Wager<S> {
    store: S,
}

impl<S: Store> Wager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> WagerResult<T>) -> WagerResult<T> {
        self.store.read(f)?
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> WagerResult<T>) -> WagerResult<T> {
        self.store.transaction(f)
    }

    // ---- Users and games ----

    pub fn register_user(&self, name: &str) -> WagerResult<User> {
        self.write(|t| users::register_user(t, name, Utc::now()))
    }

    pub fn user(&self, id: UserId) -> WagerResult<User> {
        self.read(|t| t.user(id).cloned().ok_or_else(|| WagerError::not_found(id)))
    }

    pub fn user_by_name(&self, name: &str) -> WagerResult<User> {
        let name = name.trim().to_lowercase();
        self.read(|t| {
            t.user_by_name(&name)
                .cloned()
                .ok_or_else(|| WagerError::not_found(format!("user '{name}'")))
        })
    }

    pub fn users(&self) -> WagerResult<Vec<User>> {
        self.read(|t| Ok(t.users().cloned().collect()))
    }

    pub fn users_in_session(&self, session_id: SessionId) -> WagerResult<Vec<User>> {
        self.read(|t| {
            require_session(t, session_id)?;
            Ok(t.participants(session_id)
                .iter()
                .filter_map(|p| t.user(p.user_id).cloned())
                .collect())
        })
    }

    pub fn create_game(&self, name: &str) -> WagerResult<Game> {
        self.write(|t| users::create_game(t, name))
    }

    pub fn game(&self, id: GameId) -> WagerResult<Game> {
        self.read(|t| t.game(id).cloned().ok_or_else(|| WagerError::not_found(id)))
    }

    pub fn games(&self, page: Page) -> WagerResult<Vec<Game>> {
        self.read(|t| Ok(page.apply(t.games().cloned())))
    }

    // ---- Sessions ----

    /// Start a session for at least two distinct registered users.
    pub fn create_session(&self, participant_ids: &[UserId]) -> WagerResult<Session> {
        let distinct: BTreeSet<UserId> = participant_ids.iter().copied().collect();
        if distinct.len() != participant_ids.len() {
            return Err(WagerError::InvalidInput("participants must be distinct".into()));
        }
        if distinct.len() < 2 {
            return Err(WagerError::InvalidInput(
                "a session needs at least two participants".into(),
            ));
        }

        self.write(|t| {
            if let Some(&missing) = participant_ids.iter().find(|&&id| t.user(id).is_none()) {
                return Err(WagerError::not_found(missing));
            }
            if t.active_session().is_some() {
                return Err(WagerError::AlreadyActive("session"));
            }
            let row = SessionMachine::create(t, participant_ids, Utc::now())?;
            Session::load(t, &row)
        })
    }

    pub fn end_session(&self, id: SessionId) -> WagerResult<Session> {
        self.write(|t| {
            let row = SessionMachine::end(t, id, Utc::now())?;
            Session::load(t, &row)
        })
    }

    pub fn cancel_session(&self, id: SessionId) -> WagerResult<()> {
        self.write(|t| SessionMachine::cancel(t, id).map(|_| ()))?;
        info!(session_id = %id, "session cancelled");
        Ok(())
    }

    pub fn session(&self, id: SessionId) -> WagerResult<Session> {
        self.read(|t| Session::load(t, require_session(t, id)?))
    }

    pub fn session_detail(&self, id: SessionId) -> WagerResult<SessionDetail> {
        self.read(|t| SessionDetail::load(t, require_session(t, id)?))
    }

    /// Active session first, then ended sessions, most recently ended first.
    pub fn sessions(&self, page: Page) -> WagerResult<Vec<Session>> {
        self.read(|t| {
            page.apply(sessions_by_recency(t))
                .into_iter()
                .map(|row| Session::load(t, row))
                .collect()
        })
    }

    /// Same order as [`Wager::sessions`], each with its users and game sessions.
    pub fn sessions_with_game_sessions(&self, page: Page) -> WagerResult<Vec<SessionDetail>> {
        self.read(|t| {
            page.apply(sessions_by_recency(t))
                .into_iter()
                .map(|row| SessionDetail::load(t, row))
                .collect()
        })
    }

    pub fn active_session(&self) -> WagerResult<Option<Session>> {
        self.read(|t| t.active_session().map(|row| Session::load(t, row)).transpose())
    }

    pub fn has_active_session(&self) -> WagerResult<bool> {
        self.read(|t| Ok(t.active_session().is_some()))
    }

    pub fn participants(&self, session_id: SessionId) -> WagerResult<Vec<Participant>> {
        self.read(|t| {
            require_session(t, session_id)?;
            Ok(t.participants(session_id))
        })
    }

    // ---- Game sessions ----

    /// Start a game session in an active session, with round #1 open.
    pub fn create_game_session(
        &self,
        session_id: SessionId,
        game_id: GameId,
        wager: u64,
    ) -> WagerResult<GameSession> {
        check_wager(wager)?;
        self.write(|t| {
            let session = require_session(t, session_id)?;
            if !session.is_active() {
                return Err(WagerError::ended(session_id));
            }
            if t.game(game_id).is_none() {
                return Err(WagerError::not_found(game_id));
            }
            if t.active_game_session(session_id).is_some() {
                return Err(WagerError::AlreadyActive("game session"));
            }
            let row = GameSessionMachine::create(t, session_id, game_id, wager, Utc::now())?;
            GameSession::load(t, &row)
        })
    }

    pub fn new_round(&self, id: GameSessionId, wager: u64) -> WagerResult<GameSession> {
        check_wager(wager)?;
        self.write(|t| {
            let round = GameSessionMachine::new_round(t, id, wager)?;
            info!(game_session_id = %id, round = round.sequence, wager, "round started");
            load_game_session(t, id)
        })
    }

    pub fn end_round(&self, id: GameSessionId, winner: UserId) -> WagerResult<GameSession> {
        self.write(|t| {
            let round = GameSessionMachine::end_round(t, id, winner)?;
            info!(game_session_id = %id, round = round.sequence, winner = %winner, "round ended");
            load_game_session(t, id)
        })
    }

    pub fn end_game_session(&self, id: GameSessionId) -> WagerResult<GameSession> {
        self.write(|t| {
            GameSessionMachine::end(t, id, Utc::now())?;
            load_game_session(t, id)
        })
    }

    pub fn cancel_game_session(&self, id: GameSessionId) -> WagerResult<()> {
        self.write(|t| GameSessionMachine::cancel(t, id).map(|_| ()))?;
        info!(game_session_id = %id, "game session cancelled");
        Ok(())
    }

    pub fn game_session(&self, id: GameSessionId) -> WagerResult<GameSession> {
        self.read(|t| load_game_session(t, id))
    }

    /// Active game session first, then ended ones, most recently ended first.
    pub fn game_sessions(&self, session_id: SessionId, page: Page) -> WagerResult<Vec<GameSession>> {
        self.read(|t| {
            require_session(t, session_id)?;
            page.apply(game_sessions_by_recency(t, session_id))
                .into_iter()
                .map(|row| GameSession::load(t, row))
                .collect()
        })
    }

    pub fn active_game_session(&self, session_id: SessionId) -> WagerResult<Option<GameSession>> {
        self.read(|t| {
            require_session(t, session_id)?;
            t.active_game_session(session_id)
                .map(|row| GameSession::load(t, row))
                .transpose()
        })
    }

    pub fn has_active_game_session(&self, session_id: SessionId) -> WagerResult<bool> {
        self.read(|t| {
            require_session(t, session_id)?;
            Ok(t.active_game_session(session_id).is_some())
        })
    }

    // ---- Rounds ----

    pub fn round(&self, id: RoundId) -> WagerResult<Round> {
        self.read(|t| {
            let row = t.round(id).ok_or_else(|| WagerError::not_found(id))?;
            Round::from_row(row)
        })
    }

    /// Rounds of a game session, highest sequence first.
    pub fn rounds(&self, game_session_id: GameSessionId, page: Page) -> WagerResult<Vec<Round>> {
        self.read(|t| {
            if t.game_session(game_session_id).is_none() {
                return Err(WagerError::not_found(game_session_id));
            }
            page.apply(t.rounds_of(game_session_id))
                .into_iter()
                .map(Round::from_row)
                .collect()
        })
    }

    // ---- Global ledger and reconciliation ----

    /// The global ledger, created over every registered user on first use.
    pub fn current_global_ledger(&self) -> WagerResult<Ledger> {
        let has_row = self.read(|t| Ok(t.global().is_some()))?;
        if has_row {
            self.read(GlobalLedger::peek)
        } else {
            self.write(|t| GlobalLedger::current(t, Utc::now()))
        }
    }

    pub fn reconcile(&self) -> WagerResult<ReconcileReport> {
        self.read(reconcile::reconcile)
    }

    /// Rewrite drifted aggregates in one transaction.
    pub fn repair(&self) -> WagerResult<ReconcileReport> {
        let report = self.write(|t| reconcile::repair(t, Utc::now()))?;
        info!(checked = report.checked, repaired = report.drifts.len(), "reconciliation repair");
        Ok(report)
    }
}

fn check_wager(wager: u64) -> WagerResult<()> {
    if wager == 0 {
        return Err(WagerError::InvalidInput("wager must be greater than zero".into()));
    }
    Ok(())
}

fn require_session(t: &Tables, id: SessionId) -> WagerResult<&SessionRow> {
    t.session(id).ok_or_else(|| WagerError::not_found(id))
}

fn load_game_session(t: &Tables, id: GameSessionId) -> WagerResult<GameSession> {
    let row = t.game_session(id).ok_or_else(|| WagerError::not_found(id))?;
    GameSession::load(t, row)
}

#[cfg(test)]
mod tests {
    use wager_store::InMemoryStore;

    use super::*;

    fn u(raw: u64) -> UserId {
        UserId::new(raw)
    }

    fn wager_with_users(names: &[&str]) -> Wager<InMemoryStore> {
        let w = Wager::new(InMemoryStore::new());
        for name in names {
            w.register_user(name).unwrap();
        }
        w.create_game("Dice").unwrap();
        w
    }

    // ---- Input gates ----

    #[test]
    fn session_needs_two_distinct_known_users() {
        let w = wager_with_users(&["ann", "ben"]);
        assert!(matches!(w.create_session(&[u(1)]), Err(WagerError::InvalidInput(_))));
        assert!(matches!(w.create_session(&[u(1), u(1)]), Err(WagerError::InvalidInput(_))));
        assert!(matches!(w.create_session(&[u(1), u(9)]), Err(WagerError::NotFound(_))));
        assert!(!w.has_active_session().unwrap());
    }

    #[test]
    fn second_active_session_is_rejected() {
        let w = wager_with_users(&["ann", "ben"]);
        w.create_session(&[u(1), u(2)]).unwrap();
        let err = w.create_session(&[u(1), u(2)]).unwrap_err();
        assert!(matches!(err, WagerError::AlreadyActive("session")));
    }

    #[test]
    fn zero_wager_is_invalid() {
        let w = wager_with_users(&["ann", "ben"]);
        let s = w.create_session(&[u(1), u(2)]).unwrap();
        let err = w.create_game_session(s.id, GameId::new(1), 0).unwrap_err();
        assert!(matches!(err, WagerError::InvalidInput(_)));
    }

    #[test]
    fn game_session_in_ended_session_is_refused() {
        let w = wager_with_users(&["ann", "ben"]);
        let s = w.create_session(&[u(1), u(2)]).unwrap();
        w.end_session(s.id).unwrap();
        let err = w.create_game_session(s.id, GameId::new(1), 5).unwrap_err();
        assert!(matches!(err, WagerError::Ended(_)));
    }

    // ---- Reads ----

    #[test]
    fn sessions_list_active_first() {
        let w = wager_with_users(&["ann", "ben"]);
        let s1 = w.create_session(&[u(1), u(2)]).unwrap();
        w.end_session(s1.id).unwrap();
        let s2 = w.create_session(&[u(1), u(2)]).unwrap();
        w.end_session(s2.id).unwrap();
        let s3 = w.create_session(&[u(1), u(2)]).unwrap();

        let ids: Vec<SessionId> = w.sessions(Page::default()).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![s3.id, s2.id, s1.id]);

        let page: Vec<SessionId> = w.sessions(Page::new(1, 1)).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(page, vec![s2.id]);
        assert_eq!(w.active_session().unwrap().unwrap().id, s3.id);
    }

    #[test]
    fn sessions_with_game_sessions_nests_children() {
        let w = wager_with_users(&["ann", "ben", "cat"]);
        let s1 = w.create_session(&[u(1), u(2)]).unwrap();
        let gs = w.create_game_session(s1.id, GameId::new(1), 10).unwrap();
        w.end_round(gs.id, u(1)).unwrap();
        w.end_game_session(gs.id).unwrap();
        w.end_session(s1.id).unwrap();
        let s2 = w.create_session(&[u(2), u(3)]).unwrap();
        let live = w.create_game_session(s2.id, GameId::new(1), 20).unwrap();

        let listed = w.sessions_with_game_sessions(Page::default()).unwrap();
        let ids: Vec<SessionId> = listed.iter().map(|d| d.session.id).collect();
        assert_eq!(ids, vec![s2.id, s1.id]);
        assert_eq!(listed[0].game_sessions.len(), 1);
        assert_eq!(listed[0].game_sessions[0].id, live.id);
        assert!(listed[0].game_sessions[0].ended.is_none());
        assert_eq!(listed[1].game_sessions[0].id, gs.id);
        assert_eq!(listed[1].users.len(), 2);

        let tail = w.sessions_with_game_sessions(Page::new(1, 1)).unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].session.id, s1.id);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let w = wager_with_users(&["ann", "ben"]);
        assert!(matches!(w.session(SessionId::new(5)), Err(WagerError::NotFound(_))));
        assert!(matches!(w.game_session(GameSessionId::new(5)), Err(WagerError::NotFound(_))));
        assert!(matches!(w.round(RoundId::new(5)), Err(WagerError::NotFound(_))));
        assert!(matches!(w.has_active_game_session(SessionId::new(5)), Err(WagerError::NotFound(_))));
        assert!(matches!(w.user_by_name("zed"), Err(WagerError::NotFound(_))));
    }

    #[test]
    fn user_lookup_by_name_normalizes() {
        let w = wager_with_users(&["ann", "ben"]);
        assert_eq!(w.user_by_name(" ANN ").unwrap().id, u(1));
    }

    #[test]
    fn global_ledger_exists_after_first_user() {
        let w = wager_with_users(&["ann", "ben", "cat"]);
        let global = w.current_global_ledger().unwrap();
        assert_eq!(global.len(), 3);
        assert!(!global.has_any_debt());
    }

    #[test]
    fn global_ledger_is_created_on_first_read() {
        let w = Wager::new(InMemoryStore::new());
        assert!(w.current_global_ledger().unwrap().is_empty());
        assert!(w.store().read(|t| t.global().is_some()).unwrap());
    }
}
