use std::collections::BTreeMap;

use serde::Serialize;
use wager_types::{HasLedgerIdentity, UserId};

use crate::error::LedgerError;

type Row = BTreeMap<UserId, u64>;

/// Pairwise debt table: `rows[ower][owee]` is what `ower` owes `owee`.
///
/// Rows and columns are the same participant set. Ordering is by [`UserId`],
/// which makes iteration and the stored form deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    rows: BTreeMap<UserId, Row>,
}

impl Ledger {
    /// Create a zeroed ledger over `participants`.
    ///
    /// Duplicate identities collapse into one participant. An empty input
    /// yields an empty ledger.
    pub fn new<P: HasLedgerIdentity>(participants: impl IntoIterator<Item = P>) -> Self {
        let ids: Vec<UserId> = {
            let mut ids: Vec<UserId> = participants
                .into_iter()
                .map(|p| p.ledger_identity())
                .collect();
            ids.sort();
            ids.dedup();
            ids
        };

        let rows = ids
            .iter()
            .map(|&ower| {
                let row = ids
                    .iter()
                    .filter(|&&owee| owee != ower)
                    .map(|&owee| (owee, 0))
                    .collect();
                (ower, row)
            })
            .collect();

        Self { rows }
    }

    pub(crate) fn from_rows(rows: BTreeMap<UserId, Row>) -> Self {
        Self { rows }
    }

    pub(crate) fn rows(&self) -> &BTreeMap<UserId, Row> {
        &self.rows
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Membership test.
    pub fn contains(&self, id: UserId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Participants in ascending id order.
    pub fn participants(&self) -> impl Iterator<Item = UserId> + '_ {
        self.rows.keys().copied()
    }

    /// What `ower` owes `owee`; zero for absent entries.
    pub fn amount(&self, ower: UserId, owee: UserId) -> u64 {
        self.rows
            .get(&ower)
            .and_then(|row| row.get(&owee))
            .copied()
            .unwrap_or(0)
    }

    /// Every `(ower, owee, amount)` entry, zeros included.
    pub fn entries(&self) -> impl Iterator<Item = (UserId, UserId, u64)> + '_ {
        self.rows.iter().flat_map(|(&ower, row)| {
            row.iter().map(move |(&owee, &amount)| (ower, owee, amount))
        })
    }

    /// Only the non-zero entries.
    pub fn debts(&self) -> impl Iterator<Item = (UserId, UserId, u64)> + '_ {
        self.entries().filter(|&(_, _, amount)| amount > 0)
    }

    pub fn has_any_debt(&self) -> bool {
        self.debts().next().is_some()
    }

    /// Sum of every entry.
    pub fn total(&self) -> u128 {
        self.entries().map(|(_, _, amount)| u128::from(amount)).sum()
    }

    /// Net position of `id`: owed to it minus owed by it. Positive means the
    /// participant is up.
    pub fn balance(&self, id: UserId) -> i128 {
        let owed_by: i128 = self
            .rows
            .get(&id)
            .map(|row| row.values().map(|&a| i128::from(a)).sum())
            .unwrap_or(0);
        let owed_to: i128 = self
            .rows
            .iter()
            .filter_map(|(_, row)| row.get(&id))
            .map(|&a| i128::from(a))
            .sum();
        owed_to - owed_by
    }

    /// Credit `winner` with an equal share of `wager` from every other
    /// participant.
    ///
    /// The share is `floor(wager / (n - 1))`; the remainder is dropped. The
    /// ledger is not netted. Returns the share that was added to each entry.
    pub fn credit(&mut self, winner: UserId, wager: u64) -> Result<u64, LedgerError> {
        if !self.contains(winner) {
            return Err(LedgerError::UnknownParticipant(winner));
        }
        let n = self.rows.len();
        if n < 2 {
            return Err(LedgerError::TooFewParticipants(n));
        }
        let share = wager / (n as u64 - 1);

        // Check every cell first so a failure leaves the ledger untouched.
        for (&ower, row) in &self.rows {
            if ower == winner {
                continue;
            }
            let current = row.get(&winner).copied().unwrap_or(0);
            if current.checked_add(share).is_none() {
                return Err(LedgerError::AmountOverflow { ower, owee: winner });
            }
        }

        for (ower, row) in self.rows.iter_mut() {
            if *ower != winner {
                *row.entry(winner).or_insert(0) += share;
            }
        }
        Ok(share)
    }

    /// Net every pair so that at most one direction is non-zero.
    ///
    /// Each unordered pair is read once and written once, so the result never
    /// depends on iteration order. Applying it twice is the same as once.
    pub fn resolve(&mut self) {
        let ids: Vec<UserId> = self.rows.keys().copied().collect();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let ab = self.amount(a, b);
                let ba = self.amount(b, a);
                let (ab, ba) = if ab >= ba { (ab - ba, 0) } else { (0, ba - ab) };
                self.set(a, b, ab);
                self.set(b, a, ba);
            }
        }
    }

    /// Build a fresh ledger over `participants` and add every entry of every
    /// source into it.
    ///
    /// # Precondition
    ///
    /// Every ower and owee in every source must be one of `participants`. A
    /// source keyed by anyone else is a caller bug and fails with
    /// [`LedgerError::UnknownParticipant`]; entries are never dropped. Merging a
    /// subset (a session's players) into a superset (all users) is fine.
    pub fn merge<'a, P: HasLedgerIdentity>(
        participants: impl IntoIterator<Item = P>,
        sources: impl IntoIterator<Item = &'a Ledger>,
    ) -> Result<Ledger, LedgerError> {
        let mut merged = Ledger::new(participants);
        for source in sources {
            for (ower, owee, amount) in source.entries() {
                if !merged.contains(ower) {
                    return Err(LedgerError::UnknownParticipant(ower));
                }
                if !merged.contains(owee) {
                    return Err(LedgerError::UnknownParticipant(owee));
                }
                if ower == owee {
                    continue;
                }
                let cell = merged
                    .rows
                    .get_mut(&ower)
                    .and_then(|row| row.get_mut(&owee))
                    .ok_or(LedgerError::UnknownParticipant(owee))?;
                *cell = cell
                    .checked_add(amount)
                    .ok_or(LedgerError::AmountOverflow { ower, owee })?;
            }
        }
        Ok(merged)
    }

    fn set(&mut self, ower: UserId, owee: UserId, amount: u64) {
        if let Some(row) = self.rows.get_mut(&ower) {
            match row.get_mut(&owee) {
                Some(cell) => *cell = amount,
                None if amount > 0 => {
                    row.insert(owee, amount);
                }
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<UserId> {
        raw.iter().copied().map(UserId::new).collect()
    }

    fn u(raw: u64) -> UserId {
        UserId::new(raw)
    }

    /// Assert `ower` owes exactly the given amounts.
    fn assert_row(ledger: &Ledger, ower: u64, expected: &[(u64, u64)]) {
        for &(owee, amount) in expected {
            assert_eq!(
                ledger.amount(u(ower), u(owee)),
                amount,
                "entry {ower} -> {owee}"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn new_zeroes_every_pair() {
        let ledger = Ledger::new(ids(&[1, 2, 3]));
        assert_eq!(ledger.len(), 3);
        assert_row(&ledger, 1, &[(2, 0), (3, 0)]);
        assert_row(&ledger, 2, &[(1, 0), (3, 0)]);
        assert_row(&ledger, 3, &[(1, 0), (2, 0)]);
        assert_eq!(ledger.entries().count(), 6);
        assert!(!ledger.has_any_debt());
    }

    #[test]
    fn new_has_no_self_entries() {
        let ledger = Ledger::new(ids(&[4, 5]));
        assert!(ledger.entries().all(|(a, b, _)| a != b));
    }

    #[test]
    fn new_from_empty_is_empty() {
        let ledger = Ledger::new(Vec::<UserId>::new());
        assert!(ledger.is_empty());
        assert_eq!(ledger.entries().count(), 0);
    }

    #[test]
    fn new_collapses_duplicates() {
        let ledger = Ledger::new(ids(&[1, 2, 2, 1]));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries().count(), 2);
    }

    #[test]
    fn contains_reports_membership() {
        let ledger = Ledger::new(ids(&[1, 2]));
        assert!(ledger.contains(u(1)));
        assert!(!ledger.contains(u(3)));
    }

    // -----------------------------------------------------------------------
    // Credit
    // -----------------------------------------------------------------------

    #[test]
    fn credit_splits_wager_across_losers() {
        let mut ledger = Ledger::new(ids(&[1, 2, 3]));
        let share = ledger.credit(u(1), 100).unwrap();
        assert_eq!(share, 50);
        assert_row(&ledger, 1, &[(2, 0), (3, 0)]);
        assert_row(&ledger, 2, &[(1, 50), (3, 0)]);
        assert_row(&ledger, 3, &[(1, 50), (2, 0)]);

        ledger.credit(u(3), 200).unwrap();
        assert_row(&ledger, 1, &[(2, 0), (3, 100)]);
        assert_row(&ledger, 2, &[(1, 50), (3, 100)]);
        assert_row(&ledger, 3, &[(1, 50), (2, 0)]);
    }

    #[test]
    fn credit_drops_remainder() {
        let mut ledger = Ledger::new(ids(&[1, 2, 3, 4]));
        let share = ledger.credit(u(2), 100).unwrap();
        assert_eq!(share, 33);
        assert_eq!(ledger.total(), 99);
    }

    #[test]
    fn credit_below_loser_count_adds_nothing() {
        let mut ledger = Ledger::new(ids(&[1, 2, 3]));
        assert_eq!(ledger.credit(u(1), 1).unwrap(), 0);
        assert!(!ledger.has_any_debt());
    }

    #[test]
    fn credit_unknown_winner_fails() {
        let mut ledger = Ledger::new(ids(&[1, 2]));
        assert_eq!(
            ledger.credit(u(9), 10),
            Err(LedgerError::UnknownParticipant(u(9)))
        );
    }

    #[test]
    fn credit_single_participant_fails() {
        let mut ledger = Ledger::new(ids(&[1]));
        assert_eq!(
            ledger.credit(u(1), 10),
            Err(LedgerError::TooFewParticipants(1))
        );
    }

    #[test]
    fn credit_overflow_leaves_ledger_untouched() {
        let mut ledger = Ledger::new(ids(&[1, 2]));
        ledger.credit(u(1), u64::MAX).unwrap();
        let before = ledger.clone();
        assert!(matches!(
            ledger.credit(u(1), 1),
            Err(LedgerError::AmountOverflow { .. })
        ));
        assert_eq!(ledger, before);
    }

    // -----------------------------------------------------------------------
    // Resolve
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_nets_each_pair() {
        let mut ledger = Ledger::new(ids(&[1, 2, 3]));
        ledger.credit(u(1), 100).unwrap();
        ledger.credit(u(3), 200).unwrap();
        ledger.resolve();

        assert_row(&ledger, 1, &[(2, 0), (3, 50)]);
        assert_row(&ledger, 2, &[(1, 50), (3, 100)]);
        assert_row(&ledger, 3, &[(1, 0), (2, 0)]);

        ledger.credit(u(2), 300).unwrap();
        ledger.credit(u(1), 50).unwrap();
        ledger.resolve();

        assert_row(&ledger, 1, &[(2, 75), (3, 25)]);
        assert_row(&ledger, 2, &[(1, 0), (3, 0)]);
        assert_row(&ledger, 3, &[(1, 0), (2, 50)]);
    }

    #[test]
    fn resolve_equal_debts_cancel() {
        let mut ledger = Ledger::new(ids(&[1, 2]));
        ledger.credit(u(1), 40).unwrap();
        ledger.credit(u(2), 40).unwrap();
        ledger.resolve();
        assert!(!ledger.has_any_debt());
    }

    #[test]
    fn resolve_twice_is_resolve_once() {
        let mut ledger = Ledger::new(ids(&[1, 2, 3]));
        ledger.credit(u(1), 90).unwrap();
        ledger.credit(u(2), 30).unwrap();
        ledger.resolve();
        let once = ledger.clone();
        ledger.resolve();
        assert_eq!(ledger, once);
    }

    // -----------------------------------------------------------------------
    // Merge
    // -----------------------------------------------------------------------

    #[test]
    fn merge_sums_sources() {
        let users = ids(&[1, 2, 3]);
        let mut g1 = Ledger::new(&users);
        let mut g2 = Ledger::new(&users);
        let mut g3 = Ledger::new(&users);

        g1.credit(u(1), 100).unwrap();
        g1.credit(u(3), 200).unwrap();
        g2.credit(u(1), 200).unwrap();
        g2.credit(u(2), 300).unwrap();
        g3.credit(u(3), 150).unwrap();
        g3.credit(u(2), 50).unwrap();

        let mut merged = Ledger::merge(&users, [&g1, &g2, &g3]).unwrap();
        assert_row(&merged, 1, &[(2, 175), (3, 175)]);
        assert_row(&merged, 2, &[(1, 150), (3, 175)]);
        assert_row(&merged, 3, &[(1, 150), (2, 175)]);

        merged.resolve();
        assert_row(&merged, 1, &[(2, 25), (3, 25)]);
        assert_row(&merged, 2, &[(1, 0), (3, 0)]);
        assert_row(&merged, 3, &[(1, 0), (2, 0)]);
    }

    #[test]
    fn merge_subset_into_superset() {
        let mut game = Ledger::new(ids(&[1, 2]));
        game.credit(u(2), 30).unwrap();

        let all = Ledger::merge(ids(&[1, 2, 3, 4]), [&game]).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all.amount(u(1), u(2)), 30);
        assert_eq!(all.amount(u(4), u(3)), 0);
        assert_eq!(all.entries().count(), 12);
    }

    #[test]
    fn merge_with_no_sources_is_new() {
        let merged = Ledger::merge(ids(&[1, 2]), std::iter::empty()).unwrap();
        assert_eq!(merged, Ledger::new(ids(&[1, 2])));
    }

    #[test]
    fn merge_rejects_source_outside_participants() {
        let mut game = Ledger::new(ids(&[1, 5]));
        game.credit(u(5), 10).unwrap();
        assert_eq!(
            Ledger::merge(ids(&[1, 2]), [&game]),
            Err(LedgerError::UnknownParticipant(u(5)))
        );
    }

    // -----------------------------------------------------------------------
    // Read helpers
    // -----------------------------------------------------------------------

    #[test]
    fn balance_is_net_position() {
        let mut ledger = Ledger::new(ids(&[1, 2, 3]));
        ledger.credit(u(1), 100).unwrap();
        assert_eq!(ledger.balance(u(1)), 100);
        assert_eq!(ledger.balance(u(2)), -50);
        assert_eq!(ledger.balance(u(3)), -50);
        assert_eq!(ledger.balance(u(9)), 0);
    }

    #[test]
    fn debts_skips_zero_entries() {
        let mut ledger = Ledger::new(ids(&[1, 2, 3]));
        ledger.credit(u(2), 10).unwrap();
        let debts: Vec<_> = ledger.debts().collect();
        assert_eq!(debts, vec![(u(1), u(2), 5), (u(3), u(2), 5)]);
    }
}
