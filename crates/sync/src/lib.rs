//! Bidirectional voucher synchronization engine.
//!
//! Translates local voucher mutations into outbound XML messages, parses
//! remote bulk exports back into local records, and reconciles the two
//! stores against each other. The remote accounting engine is the sole
//! source of truth for its own identifiers and offers only bulk
//! export/import over XML-HTTP.
//!
//! # Modules
//!
//! - `client` - HTTP client for the accounting gateway
//! - `envelope` - XML request envelope builders
//! - `outbound` - Local-to-remote push pipeline
//! - `inbound` - Remote export fetching and tolerant parsing
//! - `reconcile` - Insert/update/skip decisions and the sweep phase
//! - `ledgers` - Ledger-master import
//! - `store` - Storage collaborator contracts and in-memory implementations

pub mod client;
pub mod envelope;
pub mod inbound;
pub mod ledgers;
pub mod outbound;
pub mod reconcile;
pub mod store;


pub use client::TallyClient;
pub use outbound::VoucherExporter;
pub use reconcile::{sync_pull, PullOptions, PullSummary};
pub use store::{InMemoryLedgerStore, InMemoryVoucherStore, LedgerStore, VoucherStore};
