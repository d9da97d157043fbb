//! Insert/update/skip reconciliation and the sweep phase.
//!
//! One pull pass is a single serialized sweep over the full remote
//! snapshot: fetch, parse, reconcile each remote voucher into exactly
//! one decision, then delete every managed local record the snapshot no
//! longer contains. The sweep only runs when the fetch was unrestricted,
//! because correctness requires the snapshot to be complete for the
//! types being swept.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use tallybridge_core::registry::name_candidates;
use tallybridge_core::voucher::{
    diff::{decide, MatchPolicy, ReconcileDecision, VoucherKey},
    LedgerEntry, SyncOrigin, Voucher, VoucherType,
};
use tallybridge_shared::config::SyncConfig;
use tallybridge_shared::AppResult;

use crate::client::TallyClient;
use crate::envelope::voucher_collection;
use crate::inbound::{clean_export, parse_export, RemoteVoucher};
use crate::store::{LedgerStore, VoucherStore};

/// Options for one pull pass.
#[derive(Debug, Clone)]
pub struct PullOptions {
    /// Voucher types processed and swept.
    pub managed_types: Vec<VoucherType>,
    /// Identity-key policy, applied to matching and sweeping alike.
    pub match_policy: MatchPolicy,
    /// Optional date bounds. A ranged fetch is a partial snapshot, so it
    /// is never followed by a sweep.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl Default for PullOptions {
    fn default() -> Self {
        Self {
            managed_types: vec![
                VoucherType::Contra,
                VoucherType::Journal,
                VoucherType::Payment,
                VoucherType::Receipt,
            ],
            match_policy: MatchPolicy::default(),
            date_range: None,
        }
    }
}

impl PullOptions {
    /// Builds pull options from the sync configuration. Unknown type
    /// names are ignored with a warning.
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        let managed_types = config
            .managed_types
            .iter()
            .filter_map(|name| {
                let parsed = VoucherType::from_wire_name(name);
                if parsed.is_none() {
                    warn!(name = %name, "ignoring unknown managed voucher type");
                }
                parsed
            })
            .collect();
        Self {
            managed_types,
            match_policy: if config.match_by_date {
                MatchPolicy::NumberTypeDate
            } else {
                MatchPolicy::NumberType
            },
            date_range: None,
        }
    }
}

/// Outcome of one pull pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PullSummary {
    /// Usable vouchers extracted from the snapshot.
    pub fetched: usize,
    /// Voucher nodes skipped during parsing.
    pub skipped: usize,
    /// Local records inserted.
    pub inserted: usize,
    /// Local records updated.
    pub updated: usize,
    /// Remote vouchers that matched an identical local record.
    pub unchanged: usize,
    /// Local records deleted by the sweep.
    pub deleted: usize,
}

/// Runs one pull pass against the remote engine.
///
/// A transport failure aborts the pass before any local write; in
/// particular it never triggers a sweep deletion.
///
/// # Errors
///
/// [`tallybridge_shared::AppError::Transport`] when the fetch fails, or a
/// storage error from the collaborating store.
pub async fn sync_pull(
    client: &TallyClient,
    vouchers: &dyn VoucherStore,
    ledgers: &dyn LedgerStore,
    options: &PullOptions,
) -> AppResult<PullSummary> {
    let payload = voucher_collection(client.company(), options.date_range);
    let raw = client.post_xml(payload).await?;

    let parsed = parse_export(&clean_export(&raw), &options.managed_types);
    let mut summary = PullSummary {
        fetched: parsed.vouchers.len(),
        skipped: parsed.skipped,
        ..PullSummary::default()
    };

    let mut local: HashMap<VoucherKey, Voucher> = vouchers
        .list(&options.managed_types)
        .await?
        .into_iter()
        .map(|v| (VoucherKey::of(&v, options.match_policy), v))
        .collect();

    let mut seen: HashSet<VoucherKey> = HashSet::new();

    for remote in parsed.vouchers {
        let incoming = materialize(ledgers, remote).await?;
        let key = VoucherKey::of(&incoming, options.match_policy);
        seen.insert(key.clone());

        match decide(local.get(&key), &incoming) {
            ReconcileDecision::Insert => {
                debug!(number = %incoming.voucher_number, voucher_type = %incoming.voucher_type, "inserting remote voucher");
                vouchers.insert(incoming.clone()).await?;
                local.insert(key, incoming);
                summary.inserted += 1;
            }
            ReconcileDecision::Update => {
                // Content comes from the snapshot; push state and the
                // audit trail stay with the local record.
                let existing = &local[&key];
                let mut merged = incoming;
                merged.pushed = existing.pushed;
                merged.last_response = existing.last_response.clone();
                debug!(number = %merged.voucher_number, voucher_type = %merged.voucher_type, "updating from remote voucher");
                vouchers.update(merged.clone()).await?;
                local.insert(key, merged);
                summary.updated += 1;
            }
            ReconcileDecision::Skip => {
                summary.unchanged += 1;
            }
        }
    }

    if options.date_range.is_none() {
        for (key, voucher) in &local {
            if seen.contains(key) {
                continue;
            }
            // Under the date-inclusive policy a date correction shows up
            // as a stale key whose record was already replaced by the
            // corrected insert; deleting by number would kill the fresh
            // record. Only sweep when the stored record still carries the
            // stale date.
            let current = vouchers
                .find(voucher.voucher_type, &voucher.voucher_number)
                .await?;
            let Some(current) = current else { continue };
            if key.date.is_some_and(|d| d != current.date) {
                continue;
            }
            debug!(number = %voucher.voucher_number, voucher_type = %voucher.voucher_type, "sweeping obsolete voucher");
            vouchers
                .delete(voucher.voucher_type, &voucher.voucher_number)
                .await?;
            summary.deleted += 1;
        }
    }

    info!(
        fetched = summary.fetched,
        skipped = summary.skipped,
        inserted = summary.inserted,
        updated = summary.updated,
        unchanged = summary.unchanged,
        deleted = summary.deleted,
        "pull pass complete"
    );
    Ok(summary)
}

/// Turns a parsed remote voucher into a local record: ledger names are
/// resolved against the registry and the write is marked as
/// remote-originated so the exporter does not re-trigger on it.
async fn materialize(ledgers: &dyn LedgerStore, remote: RemoteVoucher) -> AppResult<Voucher> {
    let mut entries = Vec::with_capacity(remote.entries.len());
    for entry in remote.entries {
        let resolved = resolve_ledger_name(ledgers, &entry.ledger_name).await?;
        entries.push(LedgerEntry::new(resolved, entry.entry_type, entry.amount));
    }
    Ok(Voucher {
        voucher_number: remote.voucher_number,
        voucher_type: remote.voucher_type,
        date: remote.date,
        narration: remote.narration,
        entries,
        pushed: true,
        last_response: None,
        sync_origin: SyncOrigin::Remote,
    })
}

/// Resolves a remote ledger name to the canonical registry name.
///
/// Tries the fixed candidate spellings in order; falls back to the raw
/// (trimmed) name when none matches. Never inserts a master.
async fn resolve_ledger_name(ledgers: &dyn LedgerStore, raw: &str) -> AppResult<String> {
    for candidate in name_candidates(raw) {
        if ledgers.find(&candidate).await?.is_some() {
            return Ok(candidate);
        }
    }
    Ok(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLedgerStore;
    use tallybridge_core::registry::Ledger;

    #[test]
    fn test_options_from_config() {
        let config = SyncConfig {
            managed_types: vec![
                "Contra".to_string(),
                "Sales Order".to_string(),
                "Bogus".to_string(),
            ],
            match_by_date: true,
        };
        let options = PullOptions::from_config(&config);
        assert_eq!(
            options.managed_types,
            vec![VoucherType::Contra, VoucherType::SalesOrder]
        );
        assert_eq!(options.match_policy, MatchPolicy::NumberTypeDate);
        assert!(options.date_range.is_none());
    }

    #[tokio::test]
    async fn test_resolve_ledger_name_canonicalizes_punctuation() {
        let ledgers = InMemoryLedgerStore::with_ledgers([Ledger::new(
            "Traders & Sons",
            Some("Sundry Creditors".to_string()),
        )]);

        assert_eq!(
            resolve_ledger_name(&ledgers, "Traders and Sons").await.unwrap(),
            "Traders & Sons"
        );
        assert_eq!(
            resolve_ledger_name(&ledgers, " Traders  &  Sons ").await.unwrap(),
            "Traders & Sons"
        );
        // No match: fall back to the raw name, no master created
        assert_eq!(
            resolve_ledger_name(&ledgers, "Unknown Ledger").await.unwrap(),
            "Unknown Ledger"
        );
        assert!(ledgers.find("Unknown Ledger").await.unwrap().is_none());
    }
}
