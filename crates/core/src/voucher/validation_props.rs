//! Property-based tests for voucher validation rules.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{EntryType, LedgerEntry, Voucher, VoucherType};
use super::validation::{validate_voucher, VoucherValidationError};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Generate amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate an entry type.
fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

fn lookup(name: &str) -> Option<String> {
    match name {
        "Cash" => Some("Cash-in-Hand".to_string()),
        "HDFC Bank" => Some("Bank Accounts".to_string()),
        _ => None,
    }
}

fn journal(entries: Vec<LedgerEntry>) -> Voucher {
    Voucher::new_local(
        "JV-1",
        VoucherType::Journal,
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        None,
        entries,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any balanced two-sided journal voucher passes validation.
    #[test]
    fn prop_balanced_pairs_validate(amount in positive_amount()) {
        let voucher = journal(vec![
            LedgerEntry::new("Cash", EntryType::Debit, amount),
            LedgerEntry::new("HDFC Bank", EntryType::Credit, amount),
        ]);
        prop_assert!(validate_voucher(&voucher, lookup).is_ok());
    }

    /// Unequal debit and credit totals are always rejected, and the error
    /// reports the rounded totals.
    #[test]
    fn prop_unbalanced_rejected(
        amount in positive_amount(),
        delta in 1i64..1_000_000i64,
    ) {
        let other = amount + Decimal::new(delta, 2);
        let voucher = journal(vec![
            LedgerEntry::new("Cash", EntryType::Debit, amount),
            LedgerEntry::new("HDFC Bank", EntryType::Credit, other),
        ]);
        let result = validate_voucher(&voucher, lookup);
        prop_assert!(
            matches!(result, Err(VoucherValidationError::Unbalanced { .. })),
            "expected Unbalanced, got: {:?}",
            result
        );
    }

    /// A zero amount on either side is rejected before balance checking.
    #[test]
    fn prop_zero_amount_rejected(
        entry_type in entry_type_strategy(),
        other_amount in positive_amount(),
    ) {
        let opposite = match entry_type {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        };
        let voucher = journal(vec![
            LedgerEntry::new("Cash", entry_type, Decimal::ZERO),
            LedgerEntry::new("HDFC Bank", opposite, other_amount),
        ]);
        let result = validate_voucher(&voucher, lookup);
        prop_assert!(
            matches!(result, Err(VoucherValidationError::InvalidAmount { .. })),
            "expected InvalidAmount, got: {:?}",
            result
        );
    }

    /// Validation never panics on arbitrary single-entry input.
    #[test]
    fn prop_single_entry_always_insufficient(
        amount in positive_amount(),
        entry_type in entry_type_strategy(),
    ) {
        let voucher = journal(vec![LedgerEntry::new("Cash", entry_type, amount)]);
        prop_assert!(matches!(
            validate_voucher(&voucher, lookup),
            Err(VoucherValidationError::InsufficientEntries)
        ));
    }
}
