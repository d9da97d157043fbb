//! Application configuration management.

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Tally gateway configuration.
    pub gateway: GatewayConfig,
    /// Voucher synchronization configuration.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Tally gateway configuration.
///
/// Mirrors the "active configuration" record of the upstream system: the
/// company context plus the HTTP endpoint of the accounting engine.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Whether this gateway configuration is active.
    #[serde(default)]
    pub active: bool,
    /// Company name in the remote accounting engine.
    #[serde(default)]
    pub company: String,
    /// HTTP endpoint of the remote accounting engine.
    #[serde(default)]
    pub url: String,
    /// Request timeout applied to every gateway call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Voucher synchronization configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Remote voucher type names processed during a pull.
    #[serde(default = "default_managed_types")]
    pub managed_types: Vec<String>,
    /// Whether the voucher date participates in the identity key used to
    /// match local records against the remote snapshot.
    #[serde(default)]
    pub match_by_date: bool,
}

fn default_managed_types() -> Vec<String> {
    ["Contra", "Journal", "Payment", "Receipt"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            managed_types: default_managed_types(),
            match_by_date: false,
        }
    }
}

/// A resolved gateway: the company context and endpoint every wire call
/// is issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateway {
    /// Company name in the remote accounting engine.
    pub company: String,
    /// HTTP endpoint of the remote accounting engine.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Supplies the active gateway for sync operations.
///
/// The engine depends only on this contract; configuration persistence
/// lives with the caller.
pub trait GatewayResolver {
    /// Returns the active gateway.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when no active gateway exists.
    fn active_gateway(&self) -> AppResult<Gateway>;
}

impl GatewayResolver for AppConfig {
    fn active_gateway(&self) -> AppResult<Gateway> {
        if !self.gateway.active {
            return Err(AppError::Configuration(
                "No active gateway configuration found. Set gateway.active = true \
                 with the company and url of the accounting engine."
                    .to_string(),
            ));
        }
        if self.gateway.url.is_empty() || self.gateway.company.is_empty() {
            return Err(AppError::Configuration(
                "Gateway configuration is incomplete: both gateway.company and \
                 gateway.url are required."
                    .to_string(),
            ));
        }
        Ok(Gateway {
            company: self.gateway.company.clone(),
            url: self.gateway.url.clone(),
            timeout_secs: self.gateway.timeout_secs,
        })
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLYBRIDGE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
