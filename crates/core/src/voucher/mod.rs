//! Voucher domain logic.
//!
//! This module implements the double-entry voucher model:
//! - Voucher and ledger-entry types
//! - Per-type ledger-class rules
//! - Business rule validation
//! - Identity keys and content diffing for reconciliation

pub mod diff;
pub mod rules;
pub mod types;
pub mod validation;

#[cfg(test)]
mod diff_props;
#[cfg(test)]
mod validation_props;

pub use diff::{MatchPolicy, ReconcileDecision, VoucherKey};
pub use rules::LedgerRule;
pub use types::{EntryType, LedgerEntry, SyncOrigin, Voucher, VoucherType};
pub use validation::{validate_voucher, VoucherValidationError};
