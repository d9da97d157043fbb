//! Per-type ledger-class rules.
//!
//! The remote engine constrains which ledger classes may appear in each
//! voucher type. One rule table covers every type; the validator
//! interprets the rule against the parent group of each entry's ledger.

use super::types::{EntryType, VoucherType};

/// Parent groups that qualify as cash or bank ledgers.
pub const CASH_BANK_GROUPS: &[&str] = &["Cash-in-Hand", "Bank Accounts"];

/// Parent groups that qualify as purchase ledgers.
pub const PURCHASE_GROUPS: &[&str] = &["Purchase Accounts"];

/// Parent groups that qualify as sales ledgers.
pub const SALES_GROUPS: &[&str] = &["Sales Accounts"];

/// Ledger-class constraint applied to a voucher's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerRule {
    /// No ledger-class restriction.
    Unrestricted,
    /// Every entry's ledger must belong to one of the named parent groups.
    AllEntriesUnder(&'static [&'static str]),
    /// At least one entry's ledger must belong to one of the named parent
    /// groups.
    AnyEntryUnder(&'static [&'static str]),
    /// At least one entry on the given side must post to a ledger under
    /// one of the named parent groups.
    SideEntryUnder {
        /// The entry side the rule applies to.
        side: EntryType,
        /// Qualifying parent groups.
        groups: &'static [&'static str],
    },
}

impl VoucherType {
    /// Returns the ledger-class rule for this voucher type.
    #[must_use]
    pub const fn ledger_rule(self) -> LedgerRule {
        match self {
            Self::Contra => LedgerRule::AllEntriesUnder(CASH_BANK_GROUPS),
            Self::Payment | Self::Receipt => LedgerRule::AnyEntryUnder(CASH_BANK_GROUPS),
            Self::Purchase | Self::PurchaseOrder => LedgerRule::SideEntryUnder {
                side: EntryType::Debit,
                groups: PURCHASE_GROUPS,
            },
            Self::Sales | Self::SalesOrder => LedgerRule::SideEntryUnder {
                side: EntryType::Credit,
                groups: SALES_GROUPS,
            },
            Self::Journal => LedgerRule::Unrestricted,
        }
    }
}
