//! Transactional row store for wager.
//!
//! The store is the single shared datastore behind every lifecycle operation.
//! It holds plain rows (ledgers in their [`StoredLedger`] form) and enforces
//! the relational constraints the lifecycle depends on.
//!
//! # Backends
//!
//! All backends implement the [`Store`] trait:
//!
//! - [`InMemoryStore`]: `RwLock`-guarded tables for tests and embedding
//! - [`JsonFileStore`]: the same tables, persisted as one JSON document
//!
//! # Design Rules
//!
//! 1. Every mutation happens inside [`Store::transaction`]: the closure sees a
//!    private copy of the tables and its writes become visible all at once, or
//!    not at all.
//! 2. "At most one active" rules are unique constraints checked by
//!    [`Tables`] inside the same critical section as the write.
//! 3. Deleting a parent row removes its dependent rows.
//! 4. The store never interprets ledger contents.
//!
//! [`StoredLedger`]: wager_ledger::StoredLedger

pub mod error;
pub mod file;
pub mod memory;
pub mod records;
pub mod tables;
pub mod traits;

pub use error::{Constraint, StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use records::{GameSessionRow, GlobalLedgerRow, RoundRow, SessionRow, Timestamp};
pub use tables::Tables;
pub use traits::Store;
