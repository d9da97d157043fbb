//! Core voucher domain for Tallybridge.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and reconciliation decisions live here.
//!
//! # Modules
//!
//! - `voucher` - Voucher model, per-type rules, validation, and diffing
//! - `registry` - Ledger master model and name canonicalization

pub mod registry;
pub mod voucher;
