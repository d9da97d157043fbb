//! Identity keys and content diffing for reconciliation.
//!
//! Both sync directions share these comparisons: the inbound importer
//! uses them to decide insert/update/skip, the sweep phase to decide
//! delete, and the outbound exporter to decide whether a local edit
//! changed a monitored field at all.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{EntryType, LedgerEntry, Voucher, VoucherType};

/// Policy for matching local records against the remote snapshot.
///
/// The date is excluded by default so a remote date correction is treated
/// as an update rather than a delete-and-insert. Whichever policy is
/// chosen must feed matching and sweeping alike; mixing policies produces
/// duplicate inserts or premature deletes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Match on `(voucher_number, voucher_type)`.
    #[default]
    NumberType,
    /// Match on `(voucher_number, voucher_type, date)`.
    NumberTypeDate,
}

/// Identity key of a voucher under a match policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoucherKey {
    /// Normalized voucher number (trimmed, uppercased).
    pub number: String,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher date; `None` under [`MatchPolicy::NumberType`].
    pub date: Option<NaiveDate>,
}

impl VoucherKey {
    /// Computes the identity key of a voucher under the given policy.
    #[must_use]
    pub fn of(voucher: &Voucher, policy: MatchPolicy) -> Self {
        Self {
            number: normalize_number(&voucher.voucher_number),
            voucher_type: voucher.voucher_type,
            date: match policy {
                MatchPolicy::NumberType => None,
                MatchPolicy::NumberTypeDate => Some(voucher.date),
            },
        }
    }
}

/// Normalizes a voucher number for identity comparison.
#[must_use]
pub fn normalize_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Reconciliation decision for one remote voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// No local record with this identity key exists.
    Insert,
    /// A local record exists but its content differs.
    Update,
    /// A local record exists and its content matches.
    Skip,
}

/// Decides what an incoming remote voucher means for the local store.
///
/// Exactly one decision is produced per remote voucher per sync pass.
#[must_use]
pub fn decide(local: Option<&Voucher>, remote: &Voucher) -> ReconcileDecision {
    match local {
        None => ReconcileDecision::Insert,
        Some(existing) if content_equal(existing, remote) => ReconcileDecision::Skip,
        Some(_) => ReconcileDecision::Update,
    }
}

/// Returns true when two vouchers agree on every monitored field: the
/// calendar date, the narration (empty and absent are equal), and the
/// entry multiset.
#[must_use]
pub fn content_equal(a: &Voucher, b: &Voucher) -> bool {
    a.date == b.date
        && narration_text(a) == narration_text(b)
        && entries_equal(&a.entries, &b.entries)
}

/// Returns true when a local edit changed a monitored field, comparing
/// normalized representations so formatting-only differences do not
/// trigger spurious pushes.
#[must_use]
pub fn monitored_change(before: &Voucher, after: &Voucher) -> bool {
    !content_equal(before, after)
}

/// Returns true when two entry sets are equal as unordered multisets of
/// `(ledger_name, entry_type, amount)` with amounts rounded to 2 decimal
/// places.
#[must_use]
pub fn entries_equal(a: &[LedgerEntry], b: &[LedgerEntry]) -> bool {
    canonical_entries(a) == canonical_entries(b)
}

/// Canonicalizes entries to sorted `(ledger_name, entry_type, amount)`
/// tuples.
#[must_use]
pub fn canonical_entries(entries: &[LedgerEntry]) -> Vec<(String, EntryType, Decimal)> {
    let mut canonical: Vec<_> = entries
        .iter()
        .map(|e| (e.ledger_name.trim().to_string(), e.entry_type, e.amount.round_dp(2)))
        .collect();
    canonical.sort();
    canonical
}

fn narration_text(voucher: &Voucher) -> &str {
    voucher.narration.as_deref().unwrap_or("").trim()
}
