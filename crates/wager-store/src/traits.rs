//! The [`Store`] trait defining the datastore interface.

use crate::error::{StoreError, StoreResult};
use crate::tables::Tables;

/// Transactional access to the wager tables.
///
/// Implementations must be thread-safe (`Send + Sync`). Readers see only
/// committed state. Writers are serialized: a transaction holds the write
/// lock for the whole closure, so the constraint checks in [`Tables`] and the
/// writes that follow them form one critical section.
pub trait Store: Send + Sync {
    /// Run `f` against a consistent snapshot of the committed tables.
    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T>;

    /// Run `f` against a private copy of the tables.
    ///
    /// If `f` returns `Ok`, the copy becomes the committed state (and is made
    /// durable first, for persistent backends). If `f` returns `Err`, or
    /// committing fails, the committed state is left exactly as it was.
    fn transaction<T, E>(&self, f: impl FnOnce(&mut Tables) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>;
}
