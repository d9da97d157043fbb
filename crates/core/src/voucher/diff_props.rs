//! Property-based tests for reconciliation diffing.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::diff::{content_equal, decide, entries_equal, ReconcileDecision};
use super::types::{EntryType, LedgerEntry, SyncOrigin, Voucher, VoucherType};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn entry_strategy() -> impl Strategy<Value = LedgerEntry> {
    (
        prop_oneof![
            Just("Cash"),
            Just("HDFC Bank"),
            Just("Rent"),
            Just("Local Sales")
        ],
        prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)],
        amount_strategy(),
    )
        .prop_map(|(name, entry_type, amount)| LedgerEntry::new(name, entry_type, amount))
}

fn voucher_with(entries: Vec<LedgerEntry>) -> Voucher {
    Voucher {
        voucher_number: "V-1".to_string(),
        voucher_type: VoucherType::Journal,
        date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        narration: None,
        entries,
        pushed: true,
        last_response: None,
        sync_origin: SyncOrigin::Local,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Entry-set equality is order-insensitive: any permutation of the
    /// same entries compares equal.
    #[test]
    fn prop_entries_equal_under_permutation(
        entries in prop::collection::vec(entry_strategy(), 2..6),
        seed in any::<u64>(),
    ) {
        let mut shuffled = entries.clone();
        // Deterministic pseudo-shuffle driven by the seed
        let len = shuffled.len();
        for i in 0..len {
            #[allow(clippy::cast_possible_truncation)]
            let j = ((seed.wrapping_mul(i as u64 + 1)) % len as u64) as usize;
            shuffled.swap(i, j);
        }
        prop_assert!(entries_equal(&entries, &shuffled));
    }

    /// A voucher always compares equal to its own clone, so a second
    /// reconcile pass over unchanged data decides Skip.
    #[test]
    fn prop_self_comparison_is_skip(entries in prop::collection::vec(entry_strategy(), 2..6)) {
        let local = voucher_with(entries);
        let remote = local.clone();
        prop_assert!(content_equal(&local, &remote));
        prop_assert_eq!(decide(Some(&local), &remote), ReconcileDecision::Skip);
    }

    /// Changing any single entry amount flips the decision to Update.
    #[test]
    fn prop_amount_change_is_update(
        entries in prop::collection::vec(entry_strategy(), 2..6),
        index in any::<prop::sample::Index>(),
    ) {
        let local = voucher_with(entries.clone());
        let mut changed = entries;
        let i = index.index(changed.len());
        changed[i].amount += Decimal::ONE;
        let remote = voucher_with(changed);
        prop_assert_eq!(decide(Some(&local), &remote), ReconcileDecision::Update);
    }
}
