use std::fmt;

use wager_types::{GameSessionId, SessionId, UserId};

/// A uniqueness rule enforced by [`Tables`](crate::Tables).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// At most one session without an end time.
    ActiveSession,
    /// At most one active game session per session.
    ActiveGameSession(SessionId),
    /// At most one active round per game session.
    ActiveRound(GameSessionId),
    /// User names are unique.
    UserName(String),
    /// A user joins a session at most once.
    Membership { session: SessionId, user: UserId },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveSession => write!(f, "one active session"),
            Self::ActiveGameSession(id) => write!(f, "one active game session in {id}"),
            Self::ActiveRound(id) => write!(f, "one active round in {id}"),
            Self::UserName(name) => write!(f, "unique user name '{name}'"),
            Self::Membership { session, user } => write!(f, "{user} joins {session} once"),
        }
    }
}

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(Constraint),

    #[error("{table} row {id} not found")]
    RowNotFound { table: &'static str, id: u64 },

    /// A row points at a parent that does not exist, or a parent still has
    /// dependents.
    #[error("foreign key violated on {table} row {id}")]
    ForeignKey { table: &'static str, id: u64 },

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt data file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
