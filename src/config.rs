//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs:
//! server port, upstream market data endpoint, the scannable city
//! list, and the category table (base item codes + material count per
//! enchant step).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub market_data: MarketDataConfig,
    pub scan: ScanConfig,
    pub items: ItemsConfig,
    pub storage: StorageConfig,
    /// Category name → base items and per-step material count.
    pub categories: HashMap<String, CategoryConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketDataConfig {
    /// Base URL of the prices endpoint, without trailing slash.
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Upstream caps request size; id lists are chunked to this.
    pub batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// Royal cities accepted as the buy-side scan location.
    pub cities: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ItemsConfig {
    /// URL of the formatted item dump used for display names.
    pub name_db_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub hidden_items_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    pub base_items: Vec<String>,
    /// Material units consumed per enchant step for this category.
    pub material_count: u32,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// The category entry for `name`, if configured.
    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.get(name)
    }

    /// Whether `city` is one of the configured scan locations.
    pub fn is_known_city(&self, city: &str) -> bool {
        self.scan.cities.iter().any(|c| c == city)
    }
}
