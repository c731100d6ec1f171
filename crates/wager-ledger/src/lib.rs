//! Pairwise debt ledger for wager.
//!
//! A ledger maps every participant ("ower") to every other participant
//! ("owee") and the non-negative amount the ower currently owes. This crate is
//! pure data and arithmetic; it performs no I/O.
//!
//! - [`Ledger`]: in-memory table with `credit`, `resolve`, and `merge`
//! - [`StoredLedger`]: canonical string form kept by the store
//!
//! # Invariants
//!
//! 1. No participant ever has an entry against itself.
//! 2. A fresh ledger over `n` participants holds exactly `n * (n - 1)` zero entries.
//! 3. After [`Ledger::resolve`], every pair owes in at most one direction.
//! 4. `StoredLedger::parse(ledger.to_stored())` reproduces `ledger` exactly.

pub mod error;
pub mod ledger;
pub mod stored;

mod laws;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use stored::StoredLedger;
