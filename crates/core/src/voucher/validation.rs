//! Business rule validation for vouchers.
//!
//! Validation always runs before any outbound network call; the returned
//! error names the first failing rule.

use rust_decimal::Decimal;
use thiserror::Error;

use super::rules::LedgerRule;
use super::types::{EntryType, Voucher, VoucherType};

/// Validation errors for voucher operations.
#[derive(Debug, Error)]
pub enum VoucherValidationError {
    /// Voucher has fewer than two ledger entries.
    #[error("Voucher must have at least two ledger entries")]
    InsufficientEntries,

    /// A ledger entry has no ledger name.
    #[error("Ledger is mandatory on every entry")]
    MissingLedger,

    /// A ledger entry amount is zero or negative.
    #[error("Ledger amount must be greater than zero for '{ledger}'")]
    InvalidAmount {
        /// The offending entry's ledger name.
        ledger: String,
    },

    /// Debit and credit totals do not balance to 2 decimal places.
    #[error("Debit ({debits}) and Credit ({credits}) must be equal")]
    Unbalanced {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    /// An entry posts to a ledger class the voucher type does not allow.
    #[error("'{ledger}' is not allowed in {voucher_type} vouchers")]
    LedgerNotAllowed {
        /// The offending entry's ledger name.
        ledger: String,
        /// The voucher type whose rule was violated.
        voucher_type: VoucherType,
    },

    /// The voucher is missing a required cash or bank entry.
    #[error("{voucher_type} voucher must contain at least one Cash-in-Hand or Bank Accounts ledger")]
    MissingCashOrBank {
        /// The voucher type whose rule was violated.
        voucher_type: VoucherType,
    },

    /// The voucher is missing the required class ledger on one side.
    #[error("{voucher_type} voucher must have a {side:?} entry under {group}")]
    MissingClassLedger {
        /// The voucher type whose rule was violated.
        voucher_type: VoucherType,
        /// The side the rule applies to.
        side: EntryType,
        /// The first qualifying parent group, named in the message.
        group: &'static str,
    },
}

/// Validates a voucher against the invariants required before any push.
///
/// `parent_group` resolves a ledger name to its parent group in the
/// ledger registry; it returns `None` for unknown ledgers. The lookup is
/// injected so this crate stays free of storage dependencies.
///
/// # Errors
///
/// Returns the first failing rule as a [`VoucherValidationError`].
pub fn validate_voucher<F>(voucher: &Voucher, parent_group: F) -> Result<(), VoucherValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    if voucher.entries.len() < 2 {
        return Err(VoucherValidationError::InsufficientEntries);
    }

    for entry in &voucher.entries {
        if entry.ledger_name.trim().is_empty() {
            return Err(VoucherValidationError::MissingLedger);
        }
        if entry.amount <= Decimal::ZERO {
            return Err(VoucherValidationError::InvalidAmount {
                ledger: entry.ledger_name.clone(),
            });
        }
    }

    let debits = voucher.total_debit().round_dp(2);
    let credits = voucher.total_credit().round_dp(2);
    if debits != credits {
        return Err(VoucherValidationError::Unbalanced { debits, credits });
    }

    check_ledger_rule(voucher, &parent_group)
}

fn check_ledger_rule<F>(voucher: &Voucher, parent_group: &F) -> Result<(), VoucherValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let under = |ledger: &str, groups: &[&str]| {
        parent_group(ledger).is_some_and(|parent| groups.contains(&parent.as_str()))
    };

    match voucher.voucher_type.ledger_rule() {
        LedgerRule::Unrestricted => Ok(()),
        LedgerRule::AllEntriesUnder(groups) => {
            for entry in &voucher.entries {
                if !under(&entry.ledger_name, groups) {
                    return Err(VoucherValidationError::LedgerNotAllowed {
                        ledger: entry.ledger_name.clone(),
                        voucher_type: voucher.voucher_type,
                    });
                }
            }
            Ok(())
        }
        LedgerRule::AnyEntryUnder(groups) => {
            if voucher
                .entries
                .iter()
                .any(|e| under(&e.ledger_name, groups))
            {
                Ok(())
            } else {
                Err(VoucherValidationError::MissingCashOrBank {
                    voucher_type: voucher.voucher_type,
                })
            }
        }
        LedgerRule::SideEntryUnder { side, groups } => {
            if voucher
                .entries
                .iter()
                .any(|e| e.entry_type == side && under(&e.ledger_name, groups))
            {
                Ok(())
            } else {
                Err(VoucherValidationError::MissingClassLedger {
                    voucher_type: voucher.voucher_type,
                    side,
                    group: groups[0],
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voucher::types::LedgerEntry;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "Cash" => Some("Cash-in-Hand".to_string()),
            "HDFC Bank" => Some("Bank Accounts".to_string()),
            "Local Purchases" => Some("Purchase Accounts".to_string()),
            "Local Sales" => Some("Sales Accounts".to_string()),
            "Rent" => Some("Indirect Expenses".to_string()),
            _ => None,
        }
    }

    fn voucher(voucher_type: VoucherType, entries: Vec<LedgerEntry>) -> Voucher {
        Voucher::new_local(
            "V-1",
            voucher_type,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            None,
            entries,
        )
    }

    #[test]
    fn test_balanced_contra_passes() {
        let v = voucher(
            VoucherType::Contra,
            vec![
                LedgerEntry::new("Cash", EntryType::Debit, dec!(500)),
                LedgerEntry::new("HDFC Bank", EntryType::Credit, dec!(500)),
            ],
        );
        assert!(validate_voucher(&v, lookup).is_ok());
    }

    #[test]
    fn test_single_entry_rejected() {
        let v = voucher(
            VoucherType::Journal,
            vec![LedgerEntry::new("Rent", EntryType::Debit, dec!(100))],
        );
        assert!(matches!(
            validate_voucher(&v, lookup),
            Err(VoucherValidationError::InsufficientEntries)
        ));
    }

    #[test]
    fn test_missing_ledger_rejected() {
        let v = voucher(
            VoucherType::Journal,
            vec![
                LedgerEntry::new("  ", EntryType::Debit, dec!(100)),
                LedgerEntry::new("Cash", EntryType::Credit, dec!(100)),
            ],
        );
        assert!(matches!(
            validate_voucher(&v, lookup),
            Err(VoucherValidationError::MissingLedger)
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let v = voucher(
            VoucherType::Journal,
            vec![
                LedgerEntry::new("Rent", EntryType::Debit, Decimal::ZERO),
                LedgerEntry::new("Cash", EntryType::Credit, dec!(100)),
            ],
        );
        assert!(matches!(
            validate_voucher(&v, lookup),
            Err(VoucherValidationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_unbalanced_rejected() {
        let v = voucher(
            VoucherType::Journal,
            vec![
                LedgerEntry::new("Rent", EntryType::Debit, dec!(100)),
                LedgerEntry::new("Cash", EntryType::Credit, dec!(99.99)),
            ],
        );
        match validate_voucher(&v, lookup) {
            Err(VoucherValidationError::Unbalanced { debits, credits }) => {
                assert_eq!(debits, dec!(100));
                assert_eq!(credits, dec!(99.99));
            }
            other => panic!("expected Unbalanced, got {other:?}"),
        }
    }

    #[test]
    fn test_balance_compares_to_two_decimals() {
        // 0.333 + 0.667 rounds to 1.00 on both sides
        let v = voucher(
            VoucherType::Journal,
            vec![
                LedgerEntry::new("Rent", EntryType::Debit, dec!(0.333)),
                LedgerEntry::new("Rent", EntryType::Debit, dec!(0.667)),
                LedgerEntry::new("Cash", EntryType::Credit, dec!(1.00)),
            ],
        );
        assert!(validate_voucher(&v, lookup).is_ok());
    }

    #[test]
    fn test_contra_rejects_non_cash_bank_ledger() {
        let v = voucher(
            VoucherType::Contra,
            vec![
                LedgerEntry::new("Rent", EntryType::Debit, dec!(500)),
                LedgerEntry::new("HDFC Bank", EntryType::Credit, dec!(500)),
            ],
        );
        match validate_voucher(&v, lookup) {
            Err(VoucherValidationError::LedgerNotAllowed { ledger, voucher_type }) => {
                assert_eq!(ledger, "Rent");
                assert_eq!(voucher_type, VoucherType::Contra);
            }
            other => panic!("expected LedgerNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn test_payment_requires_cash_or_bank() {
        let v = voucher(
            VoucherType::Payment,
            vec![
                LedgerEntry::new("Rent", EntryType::Debit, dec!(500)),
                LedgerEntry::new("Rent", EntryType::Credit, dec!(500)),
            ],
        );
        assert!(matches!(
            validate_voucher(&v, lookup),
            Err(VoucherValidationError::MissingCashOrBank { .. })
        ));

        let v = voucher(
            VoucherType::Payment,
            vec![
                LedgerEntry::new("Rent", EntryType::Debit, dec!(500)),
                LedgerEntry::new("Cash", EntryType::Credit, dec!(500)),
            ],
        );
        assert!(validate_voucher(&v, lookup).is_ok());
    }

    #[test]
    fn test_purchase_requires_debit_purchase_ledger() {
        let v = voucher(
            VoucherType::Purchase,
            vec![
                LedgerEntry::new("Rent", EntryType::Debit, dec!(500)),
                LedgerEntry::new("Cash", EntryType::Credit, dec!(500)),
            ],
        );
        assert!(matches!(
            validate_voucher(&v, lookup),
            Err(VoucherValidationError::MissingClassLedger { .. })
        ));

        let v = voucher(
            VoucherType::Purchase,
            vec![
                LedgerEntry::new("Local Purchases", EntryType::Debit, dec!(500)),
                LedgerEntry::new("Cash", EntryType::Credit, dec!(500)),
            ],
        );
        assert!(validate_voucher(&v, lookup).is_ok());
    }

    #[test]
    fn test_sales_requires_credit_sales_ledger() {
        let v = voucher(
            VoucherType::Sales,
            vec![
                LedgerEntry::new("Cash", EntryType::Debit, dec!(500)),
                LedgerEntry::new("Local Sales", EntryType::Credit, dec!(500)),
            ],
        );
        assert!(validate_voucher(&v, lookup).is_ok());
    }

    #[test]
    fn test_unknown_ledger_fails_class_rule() {
        let v = voucher(
            VoucherType::Contra,
            vec![
                LedgerEntry::new("Mystery", EntryType::Debit, dec!(500)),
                LedgerEntry::new("HDFC Bank", EntryType::Credit, dec!(500)),
            ],
        );
        assert!(matches!(
            validate_voucher(&v, lookup),
            Err(VoucherValidationError::LedgerNotAllowed { .. })
        ));
    }
}
