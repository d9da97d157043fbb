//! Voucher domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Voucher type classification.
///
/// Each variant corresponds to a voucher kind in the remote accounting
/// engine; the wire name is the `VCHTYPE` attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// Cash/bank transfer voucher.
    Contra,
    /// General journal voucher.
    Journal,
    /// Outgoing payment voucher.
    Payment,
    /// Incoming receipt voucher.
    Receipt,
    /// Sales voucher.
    Sales,
    /// Purchase voucher.
    Purchase,
    /// Sales order voucher.
    SalesOrder,
    /// Purchase order voucher.
    PurchaseOrder,
}

impl VoucherType {
    /// All voucher types, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Contra,
        Self::Journal,
        Self::Payment,
        Self::Receipt,
        Self::Sales,
        Self::Purchase,
        Self::SalesOrder,
        Self::PurchaseOrder,
    ];

    /// Returns the wire name used in `VCHTYPE` attributes and
    /// `VOUCHERTYPENAME` elements.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Contra => "Contra",
            Self::Journal => "Journal",
            Self::Payment => "Payment",
            Self::Receipt => "Receipt",
            Self::Sales => "Sales",
            Self::Purchase => "Purchase",
            Self::SalesOrder => "Sales Order",
            Self::PurchaseOrder => "Purchase Order",
        }
    }

    /// Parses a remote type name.
    ///
    /// Unknown names yield `None`; callers skip such vouchers rather than
    /// defaulting to any type.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.wire_name() == name.trim())
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Entry type: either Debit or Credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

/// Origin of the most recent local write.
///
/// A write coming from an inbound pull carries `Remote` so the outbound
/// exporter does not re-trigger on the same write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOrigin {
    /// Written by a local user operation.
    Local,
    /// Written by the inbound importer.
    Remote,
}

/// A single ledger entry in a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Name of the ledger this entry posts to, resolved against the
    /// ledger registry.
    pub ledger_name: String,
    /// Whether this is a debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
}

impl LedgerEntry {
    /// Creates a new ledger entry.
    #[must_use]
    pub fn new(ledger_name: impl Into<String>, entry_type: EntryType, amount: Decimal) -> Self {
        Self {
            ledger_name: ledger_name.into(),
            entry_type,
            amount,
        }
    }

    /// Returns the signed wire amount.
    ///
    /// The remote engine encodes credits as positive amounts and debits as
    /// negated magnitudes.
    #[must_use]
    pub fn wire_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Credit => self.amount,
            EntryType::Debit => -self.amount,
        }
    }

    /// Returns the wire `ISDEEMEDPOSITIVE` flag: `Yes` for debits, `No`
    /// for credits.
    #[must_use]
    pub const fn deemed_positive(&self) -> bool {
        matches!(self.entry_type, EntryType::Debit)
    }
}

/// A double-entry accounting voucher.
///
/// Identity is the `(voucher_number, voucher_type)` pair; the remote
/// engine owns all of its internal identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher number, unique per voucher type.
    pub voucher_number: String,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher date.
    pub date: NaiveDate,
    /// Optional narration text.
    pub narration: Option<String>,
    /// Ledger entries, in entry order.
    pub entries: Vec<LedgerEntry>,
    /// Whether this record has been successfully sent outbound at least once.
    pub pushed: bool,
    /// Raw remote response text from the most recent push, kept for audit.
    pub last_response: Option<String>,
    /// Origin of the most recent write.
    pub sync_origin: SyncOrigin,
}

impl Voucher {
    /// Creates a locally-authored voucher that has not been pushed yet.
    #[must_use]
    pub fn new_local(
        voucher_number: impl Into<String>,
        voucher_type: VoucherType,
        date: NaiveDate,
        narration: Option<String>,
        entries: Vec<LedgerEntry>,
    ) -> Self {
        Self {
            voucher_number: voucher_number.into(),
            voucher_type,
            date,
            narration,
            entries,
            pushed: false,
            last_response: None,
            sync_origin: SyncOrigin::Local,
        }
    }

    /// Total of all debit entry amounts.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Debit)
            .map(|e| e.amount)
            .sum()
    }

    /// Total of all credit entry amounts.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Credit)
            .map(|e| e.amount)
            .sum()
    }
}
