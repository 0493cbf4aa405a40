//! Configuration module for the market data router
//!
//! Runtime settings come from `MARKET_DATA_*` environment variables (and a
//! `.env` file); the market universe of securities and entitlements is read
//! from a JSON file.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{MarketDataError, Result};
use crate::market::{Entitlements, SecurityRegistry, DEFAULT_BASE_CURRENCY};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Path to the market universe JSON file
    pub universe_path: Option<String>,

    /// Overrides the base currency of the universe file
    pub base_currency: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Where to write Prometheus text metrics on shutdown
    pub metrics_path: Option<String>,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_builder(
            config::Config::builder()
                .add_source(config::Environment::with_prefix("MARKET_DATA")),
        )
    }

    /// Build settings from an arbitrary set of sources
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder
            .set_default("log_format", "json")?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

/// Configured security
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecurityConfig {
    pub currency: String,
}

/// Securities, entitlements and base currency
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(rename = "symbols")]
    pub securities: HashMap<String, SecurityConfig>,

    #[serde(rename = "users", default)]
    pub entitlements: HashMap<String, HashSet<String>>,

    #[serde(default = "default_base_currency")]
    pub base_currency: String,
}

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

impl MarketConfig {
    /// Load the market universe from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MarketDataError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: MarketConfig = serde_json::from_str(raw)?;
        if config.base_currency.trim().is_empty() {
            return Err(MarketDataError::ConfigError(
                "base_currency must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Security registry seeded with every configured symbol
    pub fn registry(&self) -> SecurityRegistry {
        let mut registry = SecurityRegistry::new(&self.base_currency);
        for (symbol, security) in &self.securities {
            registry.register(symbol, &security.currency);
        }
        registry
    }

    pub fn entitlements(&self) -> Entitlements {
        Entitlements::new(self.entitlements.clone())
    }
}
