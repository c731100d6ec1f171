use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use wager_types::UserId;

use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Canonical string form of a [`Ledger`], as kept by the store.
///
/// The form is a JSON object keyed by decimal participant id, with both
/// levels in ascending id order:
///
/// ```text
/// {"1":{"2":0,"3":50},"2":{"1":0,"3":0},"3":{"1":0,"2":0}}
/// ```
///
/// Only [`Ledger::to_stored`] produces values of this type for new data;
/// [`StoredLedger::from_raw`] exists for loading persisted rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredLedger(String);

impl StoredLedger {
    /// Wrap a string read back from persistent storage. Not validated until
    /// [`parse`](Self::parse).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode into a [`Ledger`].
    ///
    /// Fails with [`LedgerError::Malformed`] if the text is not a nested
    /// id → id → amount object, holds a self-entry, or names an owee that has
    /// no row of its own.
    pub fn parse(&self) -> Result<Ledger, LedgerError> {
        let rows: BTreeMap<UserId, BTreeMap<UserId, u64>> =
            serde_json::from_str(&self.0).map_err(|e| LedgerError::Malformed(e.to_string()))?;

        for (ower, row) in &rows {
            for owee in row.keys() {
                if owee == ower {
                    return Err(LedgerError::Malformed(format!(
                        "self-entry for participant {ower}"
                    )));
                }
                if !rows.contains_key(owee) {
                    return Err(LedgerError::Malformed(format!(
                        "owee {owee} has no row of its own"
                    )));
                }
            }
        }

        Ok(Ledger::from_rows(rows))
    }
}

impl fmt::Display for StoredLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ledger {
    /// Encode into the canonical stored form.
    pub fn to_stored(&self) -> Result<StoredLedger, LedgerError> {
        serde_json::to_string(self.rows())
            .map(StoredLedger)
            .map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}
