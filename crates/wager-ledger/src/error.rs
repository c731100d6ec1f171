use wager_types::UserId;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A participant id is not a row of the target ledger. For `merge` this
    /// means the caller broke the superset precondition.
    #[error("participant {0} is not part of the ledger")]
    UnknownParticipant(UserId),

    #[error("crediting needs at least two participants, ledger has {0}")]
    TooFewParticipants(usize),

    #[error("amount overflow on entry {ower} -> {owee}")]
    AmountOverflow { ower: UserId, owee: UserId },

    /// The stored form was not produced by this engine.
    #[error("malformed stored ledger: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
