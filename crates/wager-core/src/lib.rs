//! Lifecycle engine for wager.
//!
//! Debts flow upward through three owning levels and a global balance sheet:
//!
//! ```text
//! Round ──credit──▶ GameSession ──absorb──▶ Session ──update──▶ Global
//! ```
//!
//! Each level is a small state machine ([`RoundMachine`],
//! [`GameSessionMachine`], [`SessionMachine`], [`GlobalLedger`]) operating on
//! the store's [`Tables`](wager_store::Tables) inside a transaction. The
//! [`Wager`] facade is the entry point: it validates input, opens the
//! transaction, and returns read views.

pub mod error;
pub mod game_session;
pub mod global;
pub mod model;
pub mod reconcile;
pub mod round;
pub mod session;
pub mod users;
pub mod wager;

pub use error::{WagerError, WagerResult};
pub use game_session::GameSessionMachine;
pub use global::GlobalLedger;
pub use model::{GameSession, Round, Session, SessionDetail};
pub use reconcile::{Drift, ReconcileReport, Scope};
pub use round::RoundMachine;
pub use session::SessionMachine;
pub use wager::Wager;

pub use wager_ledger::{Ledger, StoredLedger};
pub use wager_store::{InMemoryStore, JsonFileStore, Store};
pub use wager_types::{
    Game, GameId, GameSessionId, Page, Participant, RoundId, SessionId, User, UserId,
};
