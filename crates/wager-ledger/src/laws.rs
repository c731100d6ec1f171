//! Property tests for the ledger algebra.
//!
//! These check the laws the roll-up relies on:
//!
//! 1. **Shape**: a fresh ledger has `n * (n - 1)` zero entries.
//! 2. **Credit**: the total grows by `floor(w / (n - 1)) * (n - 1)`.
//! 3. **Resolve**: idempotent, leaves one direction per pair, and keeps each
//!    pair's net difference.
//! 4. **Merge**: entrywise sum; merging before or after netting yields the
//!    same resolved ledger.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use wager_types::UserId;

    use crate::ledger::Ledger;

    // -----------------------------------------------------------------------
    // Generators
    // -----------------------------------------------------------------------

    /// 2-6 distinct participants.
    fn arb_participants() -> impl Strategy<Value = Vec<UserId>> {
        prop::collection::btree_set(1u64..50, 2..=6)
            .prop_map(|set| set.into_iter().map(UserId::new).collect())
    }

    /// Participants plus a sequence of (winner index, wager) credits.
    fn arb_credited() -> impl Strategy<Value = (Vec<UserId>, Vec<(usize, u64)>)> {
        arb_participants().prop_flat_map(|users| {
            let n = users.len();
            let credits = prop::collection::vec((0..n, 0u64..10_000), 0..12);
            (Just(users), credits)
        })
    }

    fn build(users: &[UserId], credits: &[(usize, u64)]) -> Ledger {
        let mut ledger = Ledger::new(users);
        for &(winner, wager) in credits {
            ledger.credit(users[winner], wager).unwrap();
        }
        ledger
    }

    fn net(ledger: &Ledger, a: UserId, b: UserId) -> i128 {
        i128::from(ledger.amount(a, b)) - i128::from(ledger.amount(b, a))
    }

    // -----------------------------------------------------------------------
    // Laws
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn fresh_ledger_shape(users in arb_participants()) {
            let n = users.len();
            let ledger = Ledger::new(&users);
            prop_assert_eq!(ledger.entries().count(), n * (n - 1));
            prop_assert!(ledger.entries().all(|(a, b, amount)| a != b && amount == 0));
        }

        #[test]
        fn credit_grows_total_by_whole_shares(
            (users, credits) in arb_credited(),
            winner in any::<prop::sample::Index>(),
            wager in 0u64..1_000_000,
        ) {
            let mut ledger = build(&users, &credits);
            let before = ledger.total();
            let winner = users[winner.index(users.len())];
            let winner_row: Vec<u64> = users.iter().map(|&o| ledger.amount(winner, o)).collect();

            ledger.credit(winner, wager).unwrap();

            let losers = (users.len() - 1) as u128;
            prop_assert_eq!(ledger.total() - before, u128::from(wager) / losers * losers);
            let after_row: Vec<u64> = users.iter().map(|&o| ledger.amount(winner, o)).collect();
            prop_assert_eq!(winner_row, after_row);
        }

        #[test]
        fn resolve_is_idempotent((users, credits) in arb_credited()) {
            let mut once = build(&users, &credits);
            once.resolve();
            let mut twice = once.clone();
            twice.resolve();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn resolve_leaves_one_direction((users, credits) in arb_credited()) {
            let mut ledger = build(&users, &credits);
            ledger.resolve();
            for &a in &users {
                for &b in &users {
                    prop_assert!(ledger.amount(a, b) == 0 || ledger.amount(b, a) == 0);
                }
            }
        }

        #[test]
        fn resolve_keeps_net_difference((users, credits) in arb_credited()) {
            let raw = build(&users, &credits);
            let mut resolved = raw.clone();
            resolved.resolve();
            for &a in &users {
                for &b in &users {
                    prop_assert_eq!(net(&raw, a, b), net(&resolved, a, b));
                }
                prop_assert_eq!(raw.balance(a), resolved.balance(a));
            }
        }

        #[test]
        fn merge_is_entrywise_sum(
            (users, first) in arb_credited(),
            second in prop::collection::vec((0usize..6, 0u64..10_000), 0..8),
        ) {
            let second: Vec<(usize, u64)> = second
                .into_iter()
                .map(|(w, amount)| (w % users.len(), amount))
                .collect();
            let l1 = build(&users, &first);
            let l2 = build(&users, &second);
            let merged = Ledger::merge(&users, [&l1, &l2]).unwrap();
            for (a, b, amount) in merged.entries() {
                prop_assert_eq!(amount, l1.amount(a, b) + l2.amount(a, b));
            }
        }

        #[test]
        fn merge_with_self_doubles((users, credits) in arb_credited()) {
            let ledger = build(&users, &credits);
            let doubled = Ledger::merge(&users, [&ledger, &ledger]).unwrap();
            for (a, b, amount) in doubled.entries() {
                prop_assert_eq!(amount, ledger.amount(a, b) * 2);
            }
        }

        #[test]
        fn netting_commutes_with_merge(
            (users, first) in arb_credited(),
            second in prop::collection::vec((0usize..6, 0u64..10_000), 0..8),
        ) {
            let second: Vec<(usize, u64)> = second
                .into_iter()
                .map(|(w, amount)| (w % users.len(), amount))
                .collect();
            let l1 = build(&users, &first);
            let l2 = build(&users, &second);

            let mut raw = Ledger::merge(&users, [&l1, &l2]).unwrap();
            raw.resolve();

            let mut r1 = l1.clone();
            r1.resolve();
            let mut r2 = l2.clone();
            r2.resolve();
            let mut incremental = Ledger::merge(&users, [&r1, &r2]).unwrap();
            incremental.resolve();

            prop_assert_eq!(raw, incremental);
        }

        #[test]
        fn stored_form_round_trips((users, credits) in arb_credited()) {
            let ledger = build(&users, &credits);
            let stored = ledger.to_stored().unwrap();
            prop_assert_eq!(stored.parse().unwrap(), ledger);
        }
    }

    #[test]
    fn worked_example_three_players() {
        let users: Vec<UserId> = (1..=3).map(UserId::new).collect();
        let mut ledger = Ledger::new(&users);
        ledger.credit(UserId::new(1), 100).unwrap();
        ledger.credit(UserId::new(3), 200).unwrap();
        ledger.resolve();

        let debts: Vec<(u64, u64, u64)> = ledger
            .debts()
            .map(|(a, b, amount)| (a.get(), b.get(), amount))
            .collect();
        assert_eq!(debts, vec![(1, 3, 50), (2, 1, 50), (2, 3, 100)]);
    }
}
