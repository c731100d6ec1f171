use crate::id::UserId;

/// Anything that occupies a row and a column of a ledger.
///
/// Ledgers are always keyed by [`UserId`]; heterogeneous entities (a user, a
/// session membership row) expose which user they stand for.
pub trait HasLedgerIdentity {
    fn ledger_identity(&self) -> UserId;
}

impl HasLedgerIdentity for UserId {
    fn ledger_identity(&self) -> UserId {
        *self
    }
}

impl<T: HasLedgerIdentity + ?Sized> HasLedgerIdentity for &T {
    fn ledger_identity(&self) -> UserId {
        (**self).ledger_identity()
    }
}
