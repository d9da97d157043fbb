//! Local-to-remote push pipeline.
//!
//! Pushes run inline with the triggering local write: validation first,
//! then one HTTP call, then the push state is recorded on the voucher.
//! The raw response text is kept whatever the outcome, so the audit
//! trail survives failed imports on the remote side.

use std::collections::HashMap;

use tracing::{debug, info};

use tallybridge_core::voucher::{
    diff::monitored_change, validate_voucher, SyncOrigin, Voucher,
};
use tallybridge_shared::{AppError, AppResult};

use crate::client::TallyClient;
use crate::envelope::{voucher_mutation, MutationAction};
use crate::store::{LedgerStore, VoucherStore};

/// Pushes local voucher mutations to the remote engine.
pub struct VoucherExporter {
    client: TallyClient,
}

impl VoucherExporter {
    /// Creates an exporter over the given gateway client.
    #[must_use]
    pub fn new(client: TallyClient) -> Self {
        Self { client }
    }

    /// Handles a local insert: pushes a Create message.
    ///
    /// A record that already carries `pushed` is left alone, so a record
    /// created by an inbound pull is never re-created remotely. On
    /// success the record is marked pushed; on transport failure it stays
    /// unpushed and the next save retries the Create.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] if an invariant fails (no network call is
    /// made), [`AppError::Transport`] if the push fails on the wire.
    pub async fn push_insert(
        &self,
        vouchers: &dyn VoucherStore,
        ledgers: &dyn LedgerStore,
        voucher: &Voucher,
    ) -> AppResult<()> {
        if voucher.pushed {
            debug!(
                number = %voucher.voucher_number,
                voucher_type = %voucher.voucher_type,
                "insert already pushed, skipping"
            );
            return Ok(());
        }
        self.push(vouchers, ledgers, voucher, MutationAction::Create)
            .await
    }

    /// Handles a local edit: pushes an Alter message when warranted.
    ///
    /// The push is suppressed when the record was never pushed, when the
    /// write originated from an inbound pull, or when no monitored field
    /// (date, narration, entry set) actually changed.
    ///
    /// # Errors
    ///
    /// Same as [`Self::push_insert`].
    pub async fn push_update(
        &self,
        vouchers: &dyn VoucherStore,
        ledgers: &dyn LedgerStore,
        before: &Voucher,
        after: &Voucher,
        origin: SyncOrigin,
    ) -> AppResult<()> {
        if origin == SyncOrigin::Remote {
            debug!(
                number = %after.voucher_number,
                "write originated from pull, skipping re-export"
            );
            return Ok(());
        }
        if !after.pushed {
            return Ok(());
        }
        if !monitored_change(before, after) {
            debug!(
                number = %after.voucher_number,
                "no monitored field changed, skipping push"
            );
            return Ok(());
        }
        self.push(vouchers, ledgers, after, MutationAction::Alter)
            .await
    }

    /// Handles a local delete: pushes a Delete message if the record was
    /// ever pushed.
    ///
    /// # Errors
    ///
    /// [`AppError::Transport`] if the push fails on the wire.
    pub async fn push_delete(
        &self,
        vouchers: &dyn VoucherStore,
        voucher: &Voucher,
    ) -> AppResult<()> {
        if !voucher.pushed {
            return Ok(());
        }
        let xml = voucher_mutation(self.client.company(), voucher, MutationAction::Delete);
        self.send_and_record(vouchers, voucher, xml, MutationAction::Delete)
            .await
    }

    async fn push(
        &self,
        vouchers: &dyn VoucherStore,
        ledgers: &dyn LedgerStore,
        voucher: &Voucher,
        action: MutationAction,
    ) -> AppResult<()> {
        let parents = parent_groups(ledgers, voucher).await?;
        validate_voucher(voucher, |name| parents.get(name).cloned())
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let xml = voucher_mutation(self.client.company(), voucher, action);
        self.send_and_record(vouchers, voucher, xml, action).await
    }

    async fn send_and_record(
        &self,
        vouchers: &dyn VoucherStore,
        voucher: &Voucher,
        xml: String,
        action: MutationAction,
    ) -> AppResult<()> {
        match self.client.post_xml(xml).await {
            Ok(response) => {
                info!(
                    number = %voucher.voucher_number,
                    voucher_type = %voucher.voucher_type,
                    action = action.as_str(),
                    "pushed voucher"
                );
                vouchers
                    .record_response(
                        voucher.voucher_type,
                        &voucher.voucher_number,
                        true,
                        response,
                    )
                    .await
            }
            Err(AppError::Transport(message)) => {
                vouchers
                    .record_response(
                        voucher.voucher_type,
                        &voucher.voucher_number,
                        voucher.pushed,
                        format!("ERROR: {message}"),
                    )
                    .await?;
                Err(AppError::Transport(message))
            }
            Err(other) => Err(other),
        }
    }
}

async fn parent_groups(
    ledgers: &dyn LedgerStore,
    voucher: &Voucher,
) -> AppResult<HashMap<String, String>> {
    let mut parents = HashMap::new();
    for entry in &voucher.entries {
        let name = entry.ledger_name.trim();
        if name.is_empty() || parents.contains_key(&entry.ledger_name) {
            continue;
        }
        if let Some(parent) = ledgers.find(name).await?.and_then(|l| l.parent_group) {
            parents.insert(entry.ledger_name.clone(), parent);
        }
    }
    Ok(parents)
}
