//! Remote export fetching and tolerant parsing.
//!
//! The remote engine's XML export is not always well formed: it may
//! contain raw control characters and spurious numeric character
//! references. The importer pre-cleans the text and parses node by node
//! so one malformed voucher never aborts the whole batch.

use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use tallybridge_core::voucher::{EntryType, LedgerEntry, VoucherType};

/// A voucher as extracted from the remote export, before ledger-name
/// resolution and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteVoucher {
    /// Voucher number.
    pub voucher_number: String,
    /// Mapped voucher type.
    pub voucher_type: VoucherType,
    /// Voucher date.
    pub date: NaiveDate,
    /// Narration text, if any.
    pub narration: Option<String>,
    /// Normalized ledger entries.
    pub entries: Vec<LedgerEntry>,
}

/// Result of parsing one export document.
#[derive(Debug, Default)]
pub struct ParsedExport {
    /// Vouchers usable for reconciliation.
    pub vouchers: Vec<RemoteVoucher>,
    /// Voucher nodes skipped: unknown/unmanaged type, missing number or
    /// date, or fewer than two usable entries. Not an error condition.
    pub skipped: usize,
}

/// Pre-cleans a raw export document before XML parsing.
///
/// Strips control characters (keeping tab, newline, carriage return) and
/// drops numeric character references, which the remote engine emits for
/// glyphs its own export cannot round-trip.
#[must_use]
pub fn clean_export(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    strip_numeric_refs(&stripped)
}

fn strip_numeric_refs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'&' && i + 2 < bytes.len() && bytes[i + 1] == b'#' {
            let digits_start = i + 2;
            let mut j = digits_start;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > digits_start && j < bytes.len() && bytes[j] == b';' {
                i = j + 1;
                continue;
            }
        }
        let ch = text[i..].chars().next().unwrap_or('\u{FFFD}');
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Parses a cleaned export document into remote vouchers.
///
/// Only vouchers whose type is in `managed` are returned; everything
/// else is counted as skipped. A parse error mid-document ends the scan
/// but keeps every voucher already extracted.
#[must_use]
pub fn parse_export(xml: &str, managed: &[VoucherType]) -> ParsedExport {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut result = ParsedExport::default();
    let mut current: Option<PartialVoucher> = None;
    let mut entry: Option<PartialEntry> = None;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) => {
                // An empty voucher node can never carry two entries.
                if local_name(e.local_name().as_ref()) == "VOUCHER" {
                    result.skipped += 1;
                }
            }
            Ok(Event::Start(e)) => {
                let name = local_name(e.local_name().as_ref());
                if name == "VOUCHER" {
                    let mut partial = PartialVoucher::default();
                    for attr in e.attributes().flatten() {
                        if local_name(attr.key.as_ref()) == "VCHTYPE" {
                            partial.type_attr =
                                Some(attr.unescape_value().unwrap_or_default().to_string());
                        }
                    }
                    current = Some(partial);
                } else if is_entry_list(&name) && current.is_some() {
                    entry = Some(PartialEntry::default());
                }
                current_tag = name;
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().unwrap_or_default().to_string();
                record_text(&current_tag, &text, current.as_mut(), entry.as_mut());
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(t.as_ref()).to_string();
                record_text(&current_tag, &text, current.as_mut(), entry.as_mut());
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.local_name().as_ref());
                if is_entry_list(&name) {
                    if let (Some(partial), Some(done)) = (current.as_mut(), entry.take()) {
                        if let Some(normalized) = done.normalize() {
                            partial.entries.push(normalized);
                        }
                    }
                } else if name == "VOUCHER" {
                    if let Some(partial) = current.take() {
                        match partial.finalize(managed) {
                            Some(voucher) => result.vouchers.push(voucher),
                            None => result.skipped += 1,
                        }
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                // Keep what was extracted; the rest of the document is lost.
                warn!(error = %e, "export document truncated by parse error");
                if current.take().is_some() {
                    result.skipped += 1;
                }
                break;
            }
            Ok(_) => {}
        }
    }

    debug!(
        vouchers = result.vouchers.len(),
        skipped = result.skipped,
        "parsed voucher export"
    );
    result
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_uppercase()
}

fn is_entry_list(name: &str) -> bool {
    name == "ALLLEDGERENTRIES.LIST" || name == "LEDGERENTRIES.LIST"
}

fn record_text(
    tag: &str,
    text: &str,
    current: Option<&mut PartialVoucher>,
    entry: Option<&mut PartialEntry>,
) {
    let Some(current) = current else { return };
    if let Some(entry) = entry {
        match tag {
            "LEDGERNAME" => entry.ledger_name.push_str(text),
            "AMOUNT" => entry.amount.push_str(text),
            _ => {}
        }
        return;
    }
    match tag {
        "VOUCHERNUMBER" => current.number.push_str(text),
        "VOUCHERTYPENAME" => current.type_child.push_str(text),
        "DATE" => current.date.push_str(text),
        "NARRATION" => current.narration.push_str(text),
        _ => {}
    }
}

#[derive(Debug, Default)]
struct PartialVoucher {
    type_attr: Option<String>,
    type_child: String,
    number: String,
    date: String,
    narration: String,
    entries: Vec<LedgerEntry>,
}

impl PartialVoucher {
    fn finalize(self, managed: &[VoucherType]) -> Option<RemoteVoucher> {
        let number = self.number.trim();
        if number.is_empty() {
            return None;
        }

        let type_name = self
            .type_attr
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(self.type_child.as_str());
        // Unknown types are skipped, never defaulted.
        let voucher_type = VoucherType::from_wire_name(type_name)?;
        if !managed.contains(&voucher_type) {
            return None;
        }

        let date = parse_date(&self.date)?;
        if self.entries.len() < 2 {
            return None;
        }

        let narration = self.narration.trim();
        Some(RemoteVoucher {
            voucher_number: number.to_string(),
            voucher_type,
            date,
            narration: (!narration.is_empty()).then(|| narration.to_string()),
            entries: self.entries,
        })
    }
}

#[derive(Debug, Default)]
struct PartialEntry {
    ledger_name: String,
    amount: String,
}

impl PartialEntry {
    /// Applies the export sign convention: negative amounts are debits of
    /// the absolute value, positive amounts are credits. Entries with a
    /// missing name or zero amount are discarded.
    fn normalize(self) -> Option<LedgerEntry> {
        let name = self.ledger_name.trim();
        if name.is_empty() {
            return None;
        }
        let amount = parse_amount(&self.amount)?;
        if amount.is_zero() {
            return None;
        }
        let entry_type = if amount < Decimal::ZERO {
            EntryType::Debit
        } else {
            EntryType::Credit
        };
        Some(LedgerEntry::new(name, entry_type, amount.abs()))
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    raw.replace(',', "").trim().parse().ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}
