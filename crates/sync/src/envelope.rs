//! XML request envelope builders.
//!
//! The gateway speaks a fixed envelope dialect: mutations ride an
//! Import/Data envelope with one `VOUCHER` block per message, exports a
//! Export/Collection envelope with a TDL fetch list. All free text is
//! entity-escaped before embedding.

use chrono::NaiveDate;
use quick_xml::escape::escape;
use tallybridge_core::voucher::{EntryType, LedgerEntry, Voucher};

/// Mutation action carried in the `ACTION` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    /// Create a new remote voucher with a full body.
    Create,
    /// Alter an existing remote voucher, matched by voucher number.
    Alter,
    /// Delete an existing remote voucher, matched by voucher number.
    Delete,
}

impl MutationAction {
    /// The wire value of the `ACTION` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Alter => "Alter",
            Self::Delete => "Delete",
        }
    }
}

/// Builds the full mutation envelope for one voucher.
#[must_use]
pub fn voucher_mutation(company: &str, voucher: &Voucher, action: MutationAction) -> String {
    let block = match action {
        MutationAction::Create => create_block(voucher),
        MutationAction::Alter => alter_block(voucher),
        MutationAction::Delete => delete_block(voucher),
    };
    format!(
        "<ENVELOPE>\n \
         <HEADER>\n  \
         <VERSION>1</VERSION>\n  \
         <TALLYREQUEST>Import</TALLYREQUEST>\n  \
         <TYPE>Data</TYPE>\n  \
         <ID>Vouchers</ID>\n \
         </HEADER>\n \
         <BODY>\n  \
         <DESC>\n   \
         <STATICVARIABLES>\n    \
         <SVCURRENTCOMPANY>{}</SVCURRENTCOMPANY>\n   \
         </STATICVARIABLES>\n  \
         </DESC>\n  \
         <DATA>\n   \
         <TALLYMESSAGE>\n{}\n   \
         </TALLYMESSAGE>\n  \
         </DATA>\n \
         </BODY>\n\
         </ENVELOPE>",
        escape(company),
        block
    )
}

/// Builds the collection-export envelope for the voucher list.
///
/// Without a date range the query is unrestricted and returns the
/// complete current population; the sweep phase depends on that.
#[must_use]
pub fn voucher_collection(company: &str, range: Option<(NaiveDate, NaiveDate)>) -> String {
    let date_vars = range.map_or_else(String::new, |(from, to)| {
        format!(
            "\n        <SVFROMDATE>{}</SVFROMDATE>\n        <SVTODATE>{}</SVTODATE>",
            from.format("%Y%m%d"),
            to.format("%Y%m%d")
        )
    });
    format!(
        "<ENVELOPE>\n  \
         <HEADER><VERSION>1</VERSION><TALLYREQUEST>Export</TALLYREQUEST><TYPE>Collection</TYPE><ID>VoucherList</ID></HEADER>\n  \
         <BODY>\n    <DESC>\n      <STATICVARIABLES>\n        \
         <SVCURRENTCOMPANY>{}</SVCURRENTCOMPANY>\n        \
         <SVEXPORTFORMAT>$$SysName:XML</SVEXPORTFORMAT>{}\n      \
         </STATICVARIABLES>\n      \
         <TDL><TDLMESSAGE><COLLECTION NAME=\"VoucherList\" ISMODIFY=\"No\"><TYPE>Voucher</TYPE><FETCH>\n          \
         VOUCHERNUMBER,DATE,VCHTYPE,VOUCHERTYPENAME,NARRATION,\n          \
         ALLLEDGERENTRIES.LIST/LEDGERNAME,ALLLEDGERENTRIES.LIST/AMOUNT\n        \
         </FETCH></COLLECTION></TDLMESSAGE></TDL>\n    </DESC>\n  </BODY>\n\
         </ENVELOPE>",
        escape(company),
        date_vars
    )
}

/// Builds the collection-export envelope for the ledger-master list.
#[must_use]
pub fn ledger_collection() -> String {
    "<ENVELOPE>\n    \
     <HEADER>\n        \
     <VERSION>1</VERSION>\n        \
     <TALLYREQUEST>EXPORT</TALLYREQUEST>\n        \
     <TYPE>COLLECTION</TYPE>\n        \
     <ID>LEDGERLIST</ID>\n    \
     </HEADER>\n    \
     <BODY>\n        <DESC>\n            <TDL>\n                <TDLMESSAGE>\n                    \
     <COLLECTION NAME=\"LEDGERLIST\" ISINITIALIZE=\"Yes\">\n                        \
     <TYPE>Ledger</TYPE>\n                        \
     <FETCH>Name</FETCH>\n                        \
     <FETCH>Parent</FETCH>\n                    \
     </COLLECTION>\n                \
     </TDLMESSAGE>\n            </TDL>\n        </DESC>\n    </BODY>\n\
     </ENVELOPE>"
        .to_string()
}

/// Renders the ledger-entry block: credit entries precede debit entries,
/// each side in original order, credits positive with
/// `ISDEEMEDPOSITIVE No`, debits negated with `ISDEEMEDPOSITIVE Yes`.
#[must_use]
pub fn ledger_entries_block(entries: &[LedgerEntry]) -> String {
    let ordered = entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Credit)
        .chain(entries.iter().filter(|e| e.entry_type == EntryType::Debit));

    let mut xml = String::new();
    for entry in ordered {
        let flag = if entry.deemed_positive() { "Yes" } else { "No" };
        xml.push_str(&format!(
            "<ALLLEDGERENTRIES.LIST>\n    \
             <LEDGERNAME>{}</LEDGERNAME>\n    \
             <ISDEEMEDPOSITIVE>{}</ISDEEMEDPOSITIVE>\n    \
             <AMOUNT>{}</AMOUNT>\n\
             </ALLLEDGERENTRIES.LIST>\n",
            escape(entry.ledger_name.as_str()),
            flag,
            entry.wire_amount()
        ));
    }
    xml
}

fn create_block(voucher: &Voucher) -> String {
    let date = voucher.date.format("%Y%m%d");
    format!(
        "<VOUCHER VCHTYPE=\"{vch_type}\" ACTION=\"Create\">\n    \
         <DATE>{date}</DATE>\n    \
         <EFFECTIVEDATE>{date}</EFFECTIVEDATE>\n    \
         <VOUCHERTYPENAME>{vch_type}</VOUCHERTYPENAME>\n    \
         <PERSISTEDVIEW>Accounting Voucher View</PERSISTEDVIEW>\n    \
         <VOUCHERNUMBER>{number}</VOUCHERNUMBER>\n    \
         <NARRATION>{narration}</NARRATION>\n\
         {entries}\
         </VOUCHER>",
        vch_type = escape(voucher.voucher_type.wire_name()),
        number = escape(voucher.voucher_number.as_str()),
        narration = escape(voucher.narration.as_deref().unwrap_or("")),
        entries = ledger_entries_block(&voucher.entries),
    )
}

fn alter_block(voucher: &Voucher) -> String {
    format!(
        "<VOUCHER VCHTYPE=\"{vch_type}\"\n         \
         ACTION=\"Alter\"\n         \
         DATE=\"{date}\"\n         \
         TAGNAME=\"Voucher Number\"\n         \
         TAGVALUE=\"{number}\">\n    \
         <VOUCHERTYPENAME>{vch_type}</VOUCHERTYPENAME>\n    \
         <PERSISTEDVIEW>Accounting Voucher View</PERSISTEDVIEW>\n    \
         <NARRATION>{narration}</NARRATION>\n\
         {entries}\
         </VOUCHER>",
        vch_type = escape(voucher.voucher_type.wire_name()),
        date = voucher.date.format("%d-%b-%Y"),
        number = escape(voucher.voucher_number.as_str()),
        narration = escape(voucher.narration.as_deref().unwrap_or("")),
        entries = ledger_entries_block(&voucher.entries),
    )
}

fn delete_block(voucher: &Voucher) -> String {
    format!(
        "<VOUCHER VCHTYPE=\"{vch_type}\"\n         \
         ACTION=\"Delete\"\n         \
         DATE=\"{date}\"\n         \
         TAGNAME=\"Voucher Number\"\n         \
         TAGVALUE=\"{number}\">\n\
         </VOUCHER>",
        vch_type = escape(voucher.voucher_type.wire_name()),
        date = voucher.date.format("%d-%b-%Y"),
        number = escape(voucher.voucher_number.as_str()),
    )
}
