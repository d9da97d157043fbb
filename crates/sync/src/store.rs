//! Storage collaborator contracts.
//!
//! Record storage is owned by the embedding application; the engine only
//! depends on these traits. Implementations must apply the push-state
//! fields atomically with the write they accompany, and must match
//! voucher numbers on the normalized form (trimmed, uppercased).
//!
//! The in-memory implementations back the test suite and the dry-run
//! CLI.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tallybridge_core::registry::Ledger;
use tallybridge_core::voucher::{diff::normalize_number, Voucher, VoucherType};
use tallybridge_shared::AppResult;

/// Local voucher storage.
#[async_trait]
pub trait VoucherStore: Send + Sync {
    /// Lists all vouchers of the given types.
    async fn list(&self, types: &[VoucherType]) -> AppResult<Vec<Voucher>>;

    /// Finds a voucher by its natural `(type, number)` identity.
    async fn find(&self, voucher_type: VoucherType, number: &str) -> AppResult<Option<Voucher>>;

    /// Inserts a new voucher record.
    async fn insert(&self, voucher: Voucher) -> AppResult<()>;

    /// Replaces an existing voucher record.
    async fn update(&self, voucher: Voucher) -> AppResult<()>;

    /// Deletes a voucher record. Deleting an absent record is a no-op.
    async fn delete(&self, voucher_type: VoucherType, number: &str) -> AppResult<()>;

    /// Records the outcome of a push attempt on an existing record.
    ///
    /// `response` is stored verbatim as the audit trail; implementations
    /// must never replace an existing response with an empty value.
    async fn record_response(
        &self,
        voucher_type: VoucherType,
        number: &str,
        pushed: bool,
        response: String,
    ) -> AppResult<()>;
}

/// Ledger registry storage.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Finds a ledger master by exact canonical name.
    async fn find(&self, name: &str) -> AppResult<Option<Ledger>>;

    /// Inserts a ledger master if no master with that name exists.
    /// Returns true when a record was inserted.
    async fn insert_if_absent(&self, ledger: Ledger) -> AppResult<bool>;
}

/// In-memory voucher store.
#[derive(Debug, Default)]
pub struct InMemoryVoucherStore {
    inner: RwLock<HashMap<(VoucherType, String), Voucher>>,
}

impl InMemoryVoucherStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(voucher_type: VoucherType, number: &str) -> (VoucherType, String) {
        (voucher_type, normalize_number(number))
    }
}

#[async_trait]
impl VoucherStore for InMemoryVoucherStore {
    async fn list(&self, types: &[VoucherType]) -> AppResult<Vec<Voucher>> {
        let inner = self.inner.read().await;
        Ok(inner
            .values()
            .filter(|v| types.contains(&v.voucher_type))
            .cloned()
            .collect())
    }

    async fn find(&self, voucher_type: VoucherType, number: &str) -> AppResult<Option<Voucher>> {
        let inner = self.inner.read().await;
        Ok(inner.get(&Self::key(voucher_type, number)).cloned())
    }

    async fn insert(&self, voucher: Voucher) -> AppResult<()> {
        let key = Self::key(voucher.voucher_type, &voucher.voucher_number);
        self.inner.write().await.insert(key, voucher);
        Ok(())
    }

    async fn update(&self, voucher: Voucher) -> AppResult<()> {
        let key = Self::key(voucher.voucher_type, &voucher.voucher_number);
        self.inner.write().await.insert(key, voucher);
        Ok(())
    }

    async fn delete(&self, voucher_type: VoucherType, number: &str) -> AppResult<()> {
        self.inner
            .write()
            .await
            .remove(&Self::key(voucher_type, number));
        Ok(())
    }

    async fn record_response(
        &self,
        voucher_type: VoucherType,
        number: &str,
        pushed: bool,
        response: String,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(voucher) = inner.get_mut(&Self::key(voucher_type, number)) {
            voucher.pushed = pushed;
            if !response.is_empty() {
                voucher.last_response = Some(response);
            }
        }
        Ok(())
    }
}

/// In-memory ledger registry.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<HashMap<String, Ledger>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the given masters.
    #[must_use]
    pub fn with_ledgers(ledgers: impl IntoIterator<Item = Ledger>) -> Self {
        let inner = ledgers
            .into_iter()
            .map(|l| (l.name.clone(), l))
            .collect::<HashMap<_, _>>();
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find(&self, name: &str) -> AppResult<Option<Ledger>> {
        Ok(self.inner.read().await.get(name).cloned())
    }

    async fn insert_if_absent(&self, ledger: Ledger) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(&ledger.name) {
            return Ok(false);
        }
        inner.insert(ledger.name.clone(), ledger);
        Ok(true)
    }
}
