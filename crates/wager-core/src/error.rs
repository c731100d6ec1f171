use std::fmt::Display;

use thiserror::Error;
use wager_ledger::LedgerError;
use wager_store::{Constraint, StoreError};
use wager_types::{GameSessionId, SessionId, TypeError, UserId};

#[derive(Debug, Error)]
pub enum WagerError {
    /// A sibling round, game session, or session is already active.
    #[error("an active {0} already exists")]
    AlreadyActive(&'static str),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} has already ended")]
    Ended(String),

    #[error("{0} has no active round")]
    NoActiveRound(GameSessionId),

    #[error("{0} still has an active round")]
    RoundActive(GameSessionId),

    #[error("{0} still has an active game session")]
    GameSessionActive(SessionId),

    #[error("{winner} is not a participant of {game_session}")]
    WinnerNotParticipant {
        winner: UserId,
        game_session: GameSessionId,
    },

    #[error("{0} has history and cannot be cancelled")]
    HasHistory(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored ledger did not parse. Never retried.
    #[error("malformed ledger: {0}")]
    MalformedLedger(String),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl WagerError {
    pub(crate) fn not_found(what: impl Display) -> Self {
        Self::NotFound(what.to_string())
    }

    pub(crate) fn ended(what: impl Display) -> Self {
        Self::Ended(what.to_string())
    }

    /// True for errors caused by the current state of the lifecycle rather
    /// than by bad input or an internal failure.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyActive(_)
                | Self::AlreadyExists(_)
                | Self::Ended(_)
                | Self::NoActiveRound(_)
                | Self::RoundActive(_)
                | Self::GameSessionActive(_)
                | Self::WinnerNotParticipant { .. }
                | Self::HasHistory(_)
        )
    }
}

impl From<StoreError> for WagerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(Constraint::ActiveSession) => Self::AlreadyActive("session"),
            StoreError::UniqueViolation(Constraint::ActiveGameSession(_)) => {
                Self::AlreadyActive("game session")
            }
            StoreError::UniqueViolation(Constraint::ActiveRound(_)) => Self::AlreadyActive("round"),
            StoreError::UniqueViolation(Constraint::UserName(name)) => {
                Self::AlreadyExists(format!("user '{name}'"))
            }
            StoreError::UniqueViolation(Constraint::Membership { session, user }) => {
                Self::InvalidInput(format!("{user} listed twice for {session}"))
            }
            StoreError::RowNotFound { table, id } => Self::NotFound(format!("{table} row {id}")),
            other => Self::Store(other),
        }
    }
}

impl From<LedgerError> for WagerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Malformed(reason) => Self::MalformedLedger(reason),
            other => Self::Ledger(other),
        }
    }
}

impl From<TypeError> for WagerError {
    fn from(e: TypeError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

pub type WagerResult<T> = Result<T, WagerError>;
