//! Item display-name lookup.
//!
//! The upstream quotes deal in unique item names (`T4_MAIN_SWORD`);
//! the community item dump maps them to localized display names. The
//! dump is a few megabytes, so it is fetched once per process and
//! cached behind a read lock; scan and verify never depend on it.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// One record of the formatted item dump. Only the fields we need.
#[derive(Debug, Deserialize)]
struct ItemRecord {
    #[serde(rename = "UniqueName")]
    unique_name: String,
    #[serde(rename = "LocalizedNames", default)]
    localized_names: Option<HashMap<String, String>>,
}

pub struct ItemNameService {
    http: Client,
    url: String,
    cache: RwLock<Option<Arc<HashMap<String, String>>>>,
}

impl ItemNameService {
    pub fn new(url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("FLIPSCOUT/0.1.0 (black-market-flip-scanner)")
            .build()
            .context("Failed to build HTTP client for item names")?;

        Ok(Self {
            http,
            url: url.to_string(),
            cache: RwLock::new(None),
        })
    }

    /// The unique-name → EN-US display-name map, fetching the dump on
    /// first use.
    pub async fn names(&self) -> Result<Arc<HashMap<String, String>>> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(Arc::clone(cached));
        }

        let mut slot = self.cache.write().await;
        // Another request may have filled the cache while we waited.
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }

        let records: Vec<ItemRecord> = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Item dump request failed")?
            .json()
            .await
            .context("Failed to parse item dump")?;

        let mut names = HashMap::new();
        for record in records {
            if let Some(name) = record
                .localized_names
                .and_then(|mut l| l.remove("EN-US"))
            {
                names.insert(record.unique_name, name);
            }
        }
        info!(count = names.len(), "Item name database loaded");

        let names = Arc::new(names);
        *slot = Some(Arc::clone(&names));
        Ok(names)
    }
}
