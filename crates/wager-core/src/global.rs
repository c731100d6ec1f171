//! The singleton ledger spanning every registered user.

use tracing::debug;
use wager_ledger::Ledger;
use wager_store::{GlobalLedgerRow, Tables, Timestamp};
use wager_types::UserId;

use crate::error::WagerResult;

pub struct GlobalLedger;

impl GlobalLedger {
    /// The global ledger, created over all users if the row is absent.
    pub fn current(tables: &mut Tables, now: Timestamp) -> WagerResult<Ledger> {
        if let Some(row) = tables.global() {
            return Ok(row.ledger.parse()?);
        }
        let ledger = Ledger::new(all_users(tables));
        tables.set_global(GlobalLedgerRow {
            ledger: ledger.to_stored()?,
            updated: now,
        });
        debug!(users = ledger.len(), "global ledger created");
        Ok(ledger)
    }

    /// Read-only view: the stored ledger, or what [`current`](Self::current)
    /// would create.
    pub fn peek(tables: &Tables) -> WagerResult<Ledger> {
        match tables.global() {
            Some(row) => Ok(row.ledger.parse()?),
            None => Ok(Ledger::new(all_users(tables))),
        }
    }

    /// Fold an ended session's aggregate into the global ledger.
    pub fn update(tables: &mut Tables, incoming: &Ledger, now: Timestamp) -> WagerResult<Ledger> {
        let current = Self::current(tables, now)?;
        let mut merged = Ledger::merge(all_users(tables), [&current, incoming])?;
        merged.resolve();
        Self::store(tables, &merged, now)?;
        Ok(merged)
    }

    /// Widen the global ledger to the current user set.
    pub fn update_users(tables: &mut Tables, now: Timestamp) -> WagerResult<Ledger> {
        let current = Self::current(tables, now)?;
        let merged = Ledger::merge(all_users(tables), [&current])?;
        Self::store(tables, &merged, now)?;
        Ok(merged)
    }

    pub(crate) fn store(tables: &mut Tables, ledger: &Ledger, now: Timestamp) -> WagerResult<()> {
        tables.set_global(GlobalLedgerRow {
            ledger: ledger.to_stored()?,
            updated: now,
        });
        Ok(())
    }
}

pub(crate) fn all_users(tables: &Tables) -> Vec<UserId> {
    tables.users().map(|u| u.id).collect()
}
