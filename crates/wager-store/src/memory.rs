//! In-memory store for testing and ephemeral use.
//!
//! [`InMemoryStore`] keeps all tables behind a `RwLock`. Data is lost when
//! the store is dropped.

use std::fmt;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::tables::Tables;
use crate::traits::Store;

/// An in-memory implementation of [`Store`].
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_tables(Tables::new())
    }

    /// Start from existing tables.
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sessions = self
            .tables
            .read()
            .map(|t| t.sessions().count())
            .unwrap_or(0);
        f.debug_struct("InMemoryStore")
            .field("sessions", &sessions)
            .finish()
    }
}

impl Store for InMemoryStore {
    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&tables))
    }

    fn transaction<T, E>(&self, f: impl FnOnce(&mut Tables) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut working = tables.clone();
        let out = f(&mut working)?;
        *tables = working;
        Ok(out)
    }
}
