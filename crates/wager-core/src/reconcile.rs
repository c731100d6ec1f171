//! Re-derive every aggregate ledger from the level below and report drift.
//!
//! Netting keeps each pair's net difference and merging is an entrywise sum,
//! so an aggregate is fully determined by its sources:
//!
//! - game session: ended rounds of that game session
//! - session: ended game sessions of that session
//! - global: ended sessions, over every registered user
//!
//! Derivation is bottom-up. A session is compared against what its game
//! sessions *should* hold, so one bad game session also flags its session.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};
use wager_ledger::Ledger;
use wager_store::{Tables, Timestamp};
use wager_types::{GameSessionId, SessionId};

use crate::error::WagerResult;
use crate::global::{all_users, GlobalLedger};

/// Which stored ledger a [`Drift`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Scope {
    GameSession(GameSessionId),
    Session(SessionId),
    Global,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameSession(id) => write!(f, "{id}"),
            Self::Session(id) => write!(f, "{id}"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// A stored aggregate that differs from its derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub scope: Scope,
    pub stored: Ledger,
    pub derived: Ledger,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Number of aggregates compared.
    pub checked: usize,
    pub drifts: Vec<Drift>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.drifts.is_empty()
    }
}

/// Compare every stored aggregate with its derivation.
pub fn reconcile(tables: &Tables) -> WagerResult<ReconcileReport> {
    let mut report = ReconcileReport::default();

    let mut game_sessions: BTreeMap<GameSessionId, Ledger> = BTreeMap::new();
    for session in tables.sessions() {
        let participants = tables.participants(session.id);

        for gs in tables.game_sessions_of(session.id) {
            let rounds = tables
                .rounds_of(gs.id)
                .into_iter()
                .filter(|r| !r.active)
                .map(|r| r.ledger.parse())
                .collect::<Result<Vec<_>, _>>()?;
            let mut derived = Ledger::merge(&participants, &rounds)?;
            derived.resolve();
            compare(&mut report, Scope::GameSession(gs.id), gs.ledger.parse()?, &derived);
            game_sessions.insert(gs.id, derived);
        }
    }

    let mut sessions: BTreeMap<SessionId, Ledger> = BTreeMap::new();
    for session in tables.sessions() {
        let participants = tables.participants(session.id);
        let sources = tables
            .game_sessions_of(session.id)
            .into_iter()
            .filter(|gs| !gs.is_active())
            .filter_map(|gs| game_sessions.get(&gs.id));
        let mut derived = Ledger::merge(&participants, sources)?;
        derived.resolve();
        compare(&mut report, Scope::Session(session.id), session.ledger.parse()?, &derived);
        sessions.insert(session.id, derived);
    }

    let ended = tables
        .sessions()
        .filter(|s| !s.is_active())
        .filter_map(|s| sessions.get(&s.id));
    let mut derived = Ledger::merge(all_users(tables), ended)?;
    derived.resolve();
    compare(&mut report, Scope::Global, GlobalLedger::peek(tables)?, &derived);

    Ok(report)
}

/// Rewrite every drifted aggregate with its derivation.
///
/// Returns the report describing what was found before the rewrite.
pub fn repair(tables: &mut Tables, now: Timestamp) -> WagerResult<ReconcileReport> {
    let report = reconcile(tables)?;
    for drift in &report.drifts {
        let ledger = drift.derived.to_stored()?;
        match drift.scope {
            Scope::GameSession(id) => tables.set_game_session_ledger(id, ledger)?,
            Scope::Session(id) => tables.set_session_ledger(id, ledger)?,
            Scope::Global => GlobalLedger::store(tables, &drift.derived, now)?,
        }
        info!(scope = %drift.scope, "aggregate repaired");
    }
    Ok(report)
}

fn compare(report: &mut ReconcileReport, scope: Scope, stored: Ledger, derived: &Ledger) {
    report.checked += 1;
    if stored != *derived {
        warn!(scope = %scope, "stored aggregate differs from derivation");
        report.drifts.push(Drift {
            scope,
            stored,
            derived: derived.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use wager_types::UserId;

    use super::*;
    use crate::game_session::GameSessionMachine;
    use crate::session::SessionMachine;
    use crate::users::{create_game, register_user};

    fn u(raw: u64) -> UserId {
        UserId::new(raw)
    }

    /// Two ended sessions, the second with a game session still open.
    fn played() -> Tables {
        let mut t = Tables::new();
        for name in ["ann", "ben", "cat"] {
            register_user(&mut t, name, Utc::now()).unwrap();
        }
        let game = create_game(&mut t, "Dice").unwrap();

        let s1 = SessionMachine::create(&mut t, &[u(1), u(2), u(3)], Utc::now()).unwrap();
        let gs = GameSessionMachine::create(&mut t, s1.id, game.id, 100, Utc::now()).unwrap();
        GameSessionMachine::end_round(&mut t, gs.id, u(1)).unwrap();
        GameSessionMachine::new_round(&mut t, gs.id, 200).unwrap();
        GameSessionMachine::end_round(&mut t, gs.id, u(3)).unwrap();
        GameSessionMachine::end(&mut t, gs.id, Utc::now()).unwrap();
        SessionMachine::end(&mut t, s1.id, Utc::now()).unwrap();

        let s2 = SessionMachine::create(&mut t, &[u(2), u(3)], Utc::now()).unwrap();
        let gs = GameSessionMachine::create(&mut t, s2.id, game.id, 40, Utc::now()).unwrap();
        GameSessionMachine::end_round(&mut t, gs.id, u(2)).unwrap();
        GameSessionMachine::end(&mut t, gs.id, Utc::now()).unwrap();
        SessionMachine::end(&mut t, s2.id, Utc::now()).unwrap();

        let s3 = SessionMachine::create(&mut t, &[u(1), u(2)], Utc::now()).unwrap();
        let gs = GameSessionMachine::create(&mut t, s3.id, game.id, 10, Utc::now()).unwrap();
        GameSessionMachine::end_round(&mut t, gs.id, u(1)).unwrap();
        GameSessionMachine::new_round(&mut t, gs.id, 10).unwrap();
        t
    }

    #[test]
    fn lifecycle_output_is_consistent() {
        let t = played();
        let report = reconcile(&t).unwrap();
        assert!(report.is_consistent(), "unexpected drift: {:?}", report.drifts);
        // 3 game sessions, 3 sessions, global
        assert_eq!(report.checked, 7);
    }

    #[test]
    fn tampered_game_session_is_detected_and_repaired() {
        let mut t = played();
        let mut forged = Ledger::new([u(1), u(2), u(3)]);
        forged.credit(u(2), 1_000).unwrap();
        t.set_game_session_ledger(GameSessionId::new(1), forged.to_stored().unwrap())
            .unwrap();

        let report = reconcile(&t).unwrap();
        assert_eq!(report.drifts.len(), 1);
        assert_eq!(report.drifts[0].scope, Scope::GameSession(GameSessionId::new(1)));

        repair(&mut t, Utc::now()).unwrap();
        assert!(reconcile(&t).unwrap().is_consistent());
    }

    #[test]
    fn tampered_global_is_repaired() {
        let mut t = played();
        let before = GlobalLedger::peek(&t).unwrap();
        let blank = Ledger::new(all_users(&t));
        GlobalLedger::store(&mut t, &blank, Utc::now()).unwrap();

        let report = repair(&mut t, Utc::now()).unwrap();
        assert_eq!(report.drifts.len(), 1);
        assert_eq!(report.drifts[0].scope, Scope::Global);
        assert_eq!(GlobalLedger::peek(&t).unwrap(), before);
    }

    #[test]
    fn scope_serializes_tagged() {
        let json = serde_json::to_value(Scope::Session(SessionId::new(2))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "session", "id": 2}));
        assert_eq!(Scope::Global.to_string(), "global");
    }
}
