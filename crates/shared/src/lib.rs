//! Shared errors and configuration for Tallybridge.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management and gateway resolution

pub mod config;
pub mod error;

pub use config::{AppConfig, Gateway, GatewayResolver};
pub use error::{AppError, AppResult};
