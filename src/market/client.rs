//! Albion Data Project price client.
//!
//! Query shape: `{base_url}/{id,id,...}?locations=...&qualities=...`
//! returning one quote tuple per (item, city, quality) with standing
//! order extremes. The service is community-run and keyless.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::PriceSource;
use crate::types::PriceQuote;

pub struct AlbionDataClient {
    http: Client,
    base_url: String,
}

impl AlbionDataClient {
    pub fn new(base_url: &str, request_timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .user_agent("FLIPSCOUT/0.1.0 (black-market-flip-scanner)")
            .build()
            .context("Failed to build HTTP client for market data")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, item_ids: &[String], locations: &[String], qualities: &[u8]) -> String {
        let ids = item_ids.join(",");
        let locs = locations
            .iter()
            .map(|l| urlencoding::encode(l).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        let quals = qualities
            .iter()
            .map(|q| q.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}/{ids}?locations={locs}&qualities={quals}", self.base_url)
    }
}

#[async_trait]
impl PriceSource for AlbionDataClient {
    async fn fetch_quotes(
        &self,
        item_ids: &[String],
        locations: &[String],
        qualities: &[u8],
    ) -> Result<Vec<PriceQuote>> {
        let url = self.build_url(item_ids, locations, qualities);
        debug!(url = %url, items = item_ids.len(), "Fetching market quotes");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Market data request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Market data API error {status}: {body}");
        }

        let quotes: Vec<PriceQuote> = resp
            .json()
            .await
            .context("Failed to parse market data response")?;

        Ok(quotes)
    }
}
