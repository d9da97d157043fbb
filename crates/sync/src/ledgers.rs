//! Ledger-master import.
//!
//! Fetches the remote ledger list (name and parent group) and fills the
//! local registry with any masters it does not know yet. Existing
//! masters are left untouched.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{info, warn};

use tallybridge_core::registry::Ledger;
use tallybridge_shared::AppResult;

use crate::client::TallyClient;
use crate::envelope::ledger_collection;
use crate::inbound::clean_export;
use crate::store::LedgerStore;

/// Fetches the remote ledger list and inserts unknown masters.
///
/// Returns the names of the masters that were inserted.
///
/// # Errors
///
/// [`tallybridge_shared::AppError::Transport`] when the fetch fails, or a
/// storage error from the registry.
pub async fn import_ledgers(
    client: &TallyClient,
    ledgers: &dyn LedgerStore,
) -> AppResult<Vec<String>> {
    let raw = client.post_xml(ledger_collection()).await?;
    let parsed = parse_ledgers(&clean_export(&raw));

    let mut inserted = Vec::new();
    for ledger in parsed {
        let name = ledger.name.clone();
        if ledgers.insert_if_absent(ledger).await? {
            inserted.push(name);
        }
    }
    info!(inserted = inserted.len(), "ledger-master import complete");
    Ok(inserted)
}

/// Parses `LEDGER` nodes out of a cleaned ledger-list export.
///
/// The ledger name comes from the `NAME` attribute, the parent group
/// from the `PARENT` child element. Nameless nodes are skipped.
#[must_use]
pub fn parse_ledgers(xml: &str) -> Vec<Ledger> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut ledgers = Vec::new();
    let mut current_name: Option<String> = None;
    let mut current_parent = String::new();
    let mut in_parent = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_uppercase();
                if name == "LEDGER" {
                    current_name = name_attribute(&e);
                    current_parent.clear();
                } else if name == "PARENT" {
                    in_parent = true;
                }
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_uppercase();
                if name == "LEDGER" {
                    if let Some(ledger) = finalize(name_attribute(&e), "") {
                        ledgers.push(ledger);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if in_parent {
                    current_parent.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_uppercase();
                if name == "PARENT" {
                    in_parent = false;
                } else if name == "LEDGER" {
                    if let Some(ledger) = finalize(current_name.take(), &current_parent) {
                        ledgers.push(ledger);
                    }
                    current_parent.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "ledger list truncated by parse error");
                break;
            }
            Ok(_) => {}
        }
    }
    ledgers
}

fn name_attribute(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        (String::from_utf8_lossy(attr.key.as_ref()).to_uppercase() == "NAME")
            .then(|| attr.unescape_value().unwrap_or_default().to_string())
    })
}

fn finalize(name: Option<String>, parent: &str) -> Option<Ledger> {
    let name = name?;
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parent = parent.trim();
    Some(Ledger::new(
        trimmed,
        (!parent.is_empty()).then(|| parent.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLedgerStore;

    const EXPORT: &str = "<ENVELOPE><BODY><DATA><COLLECTION>\
        <LEDGER NAME=\"Cash\"><PARENT>Cash-in-Hand</PARENT></LEDGER>\
        <LEDGER NAME=\"HDFC Bank\"><PARENT>Bank Accounts</PARENT></LEDGER>\
        <LEDGER NAME=\"\"><PARENT>Bank Accounts</PARENT></LEDGER>\
        <LEDGER><PARENT>Orphaned</PARENT></LEDGER>\
        </COLLECTION></DATA></BODY></ENVELOPE>";

    #[test]
    fn test_parse_ledgers_reads_name_attribute_and_parent_child() {
        let ledgers = parse_ledgers(EXPORT);
        assert_eq!(
            ledgers,
            vec![
                Ledger::new("Cash", Some("Cash-in-Hand".to_string())),
                Ledger::new("HDFC Bank", Some("Bank Accounts".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_ledgers_without_parent() {
        let ledgers = parse_ledgers("<LEDGER NAME=\"Suspense\"></LEDGER>");
        assert_eq!(ledgers, vec![Ledger::new("Suspense", None)]);
    }

    #[tokio::test]
    async fn test_existing_masters_are_not_duplicated() {
        let store = InMemoryLedgerStore::with_ledgers([Ledger::new(
            "Cash",
            Some("Cash-in-Hand".to_string()),
        )]);

        let mut inserted = Vec::new();
        for ledger in parse_ledgers(EXPORT) {
            let name = ledger.name.clone();
            if store.insert_if_absent(ledger).await.unwrap() {
                inserted.push(name);
            }
        }
        assert_eq!(inserted, vec!["HDFC Bank"]);
    }
}
