//! Batched quote fetching and material price resolution.
//!
//! The upstream bounds request size, so id lists are chunked and the
//! chunks fetched sequentially. A failed chunk degrades to an empty
//! result — partial data shrinks the candidate set downstream instead
//! of failing the scan.

use futures::future::join_all;
use tracing::{debug, warn};

use super::PriceSource;
use crate::types::{MaterialKind, MaterialPrices, PriceQuote};

/// Fetch quotes for an arbitrarily long id list in fixed-size batches.
///
/// Batches run one at a time; each failure is logged and contributes
/// nothing. Result order is unspecified — callers index the quotes.
pub async fn fetch_quotes_batched(
    source: &dyn PriceSource,
    item_ids: &[String],
    locations: &[String],
    qualities: &[u8],
    batch_size: usize,
) -> Vec<PriceQuote> {
    let mut all = Vec::new();
    for batch in item_ids.chunks(batch_size.max(1)) {
        match source.fetch_quotes(batch, locations, qualities).await {
            Ok(quotes) => all.extend(quotes),
            Err(e) => warn!(
                error = %e,
                batch_len = batch.len(),
                "Quote batch failed, continuing with partial data"
            ),
        }
    }
    all
}

/// Item ids queried when resolving a tier's material prices.
///
/// The avalonian shard rides along for parity with the upstream item
/// group but does not participate in cost math (it feeds .4 upgrades,
/// which end beyond the scanned enchant range).
fn material_query_ids(tier: u8) -> Vec<String> {
    let mut ids: Vec<String> = MaterialKind::ALL
        .iter()
        .map(|kind| kind.item_id(tier))
        .collect();
    ids.push(format!("T{tier}_SHARD_AVALONIAN"));
    ids
}

/// Resolve the cheapest unit price per material kind for one tier.
///
/// Quality is pinned to 1 — materials have no quality grades. A fetch
/// failure marks the whole tier unavailable rather than erroring.
pub async fn resolve_materials(
    source: &dyn PriceSource,
    tier: u8,
    city: &str,
) -> MaterialPrices {
    let ids = material_query_ids(tier);
    let quotes = match source
        .fetch_quotes(&ids, &[city.to_string()], &[1])
        .await
    {
        Ok(quotes) => quotes,
        Err(e) => {
            warn!(error = %e, tier, "Material fetch failed, tier marked unavailable");
            return MaterialPrices::unavailable();
        }
    };

    let min_for = |kind: MaterialKind| -> Option<i64> {
        let id = kind.item_id(tier);
        quotes
            .iter()
            .filter(|q| q.item_id == id)
            .map(|q| q.sell_price_min)
            .filter(|p| *p > 0)
            .min()
    };

    let prices = MaterialPrices {
        rune: min_for(MaterialKind::Rune),
        soul: min_for(MaterialKind::Soul),
        relic: min_for(MaterialKind::Relic),
    };
    debug!(tier, ?prices, "Material prices resolved");
    prices
}

/// Resolve materials for several tiers concurrently.
///
/// Fetches are independent and target-disjoint, so they are all fired
/// at once and awaited together. Returns (tier, prices) pairs in the
/// order given.
pub async fn resolve_materials_for_tiers(
    source: &dyn PriceSource,
    tiers: &[u8],
    city: &str,
) -> Vec<(u8, MaterialPrices)> {
    let fetches = tiers
        .iter()
        .map(|&tier| async move { (tier, resolve_materials(source, tier, city).await) });
    join_all(fetches).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
