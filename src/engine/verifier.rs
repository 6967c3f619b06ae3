//! Candidate re-verification.
//!
//! Takes a previously returned candidate list and re-checks it against
//! fresh prices: exactly the start/end ids involved (deduplicated) and
//! the materials for each referenced tier. Candidates whose prices
//! moved out of profit, or whose items vanished, are dropped. The
//! output is always a subset of the input — verification never invents
//! a flip.

use std::collections::{BTreeSet, HashMap, HashSet};

use anyhow::Result;
use tracing::info;

use crate::engine::profit::taxed_profit;
use crate::market::fetch::{fetch_quotes_batched, resolve_materials_for_tiers};
use crate::market::{PriceSource, QuoteBook};
use crate::types::{
    enchant_level, MaterialKind, MaterialPrices, VerifiedItem, VerifyItem, BLACK_MARKET,
    MAX_ENCHANT, QUALITIES,
};

/// Keys refreshed on output; stale copies the client echoed back are
/// discarded so they cannot shadow the fresh values.
const REFRESHED_KEYS: [&str; 5] = [
    "startPrice",
    "sellPrice",
    "upgradeCost",
    "profitPrem",
    "profitNonPrem",
];

/// Re-verify a candidate list against fresh prices.
///
/// `batch_size` bounds the id count per upstream request, as in the
/// scan path.
pub async fn verify_items(
    source: &dyn PriceSource,
    city: &str,
    items: Vec<VerifyItem>,
    batch_size: usize,
) -> Result<Vec<VerifiedItem>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    // Fresh materials for every referenced tier, concurrently.
    let tiers: Vec<u8> = items
        .iter()
        .map(|i| i.tier)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let materials: HashMap<u8, MaterialPrices> =
        resolve_materials_for_tiers(source, &tiers, city)
            .await
            .into_iter()
            .collect();

    // Fresh quotes for the deduplicated start/end ids.
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for item in &items {
        for id in [&item.start_id, &item.end_id] {
            if seen.insert(id.clone()) {
                ids.push(id.clone());
            }
        }
    }
    let locations = vec![city.to_string(), BLACK_MARKET.to_string()];
    let quotes = fetch_quotes_batched(source, &ids, &locations, &QUALITIES, batch_size).await;
    let book = QuoteBook::from_quotes(quotes);

    let submitted = items.len();
    let mut verified = Vec::new();
    for item in items {
        let mats = materials
            .get(&item.tier)
            .copied()
            .unwrap_or_else(MaterialPrices::unavailable);

        let Some(start_price) = book.buy_price(&item.start_id, city, item.quality) else {
            continue; // item gone from the buy side
        };
        let Some(sell_price) = book.sell_price(&item.end_id, BLACK_MARKET, item.quality) else {
            continue; // Black Market no longer bidding
        };

        let Some(upgrade_cost) = fresh_upgrade_cost(&item, &mats) else {
            continue; // a required material has no observation
        };

        let profit = taxed_profit(sell_price, start_price + upgrade_cost);
        if !profit.is_worthwhile() {
            continue;
        }

        let mut item = item;
        for key in REFRESHED_KEYS {
            item.extra.remove(key);
        }
        verified.push(VerifiedItem {
            item,
            start_price,
            sell_price,
            upgrade_cost,
            profit_prem: profit.premium,
            profit_non_prem: profit.standard,
        });
    }

    verified.sort_by(|a, b| b.profit_prem.cmp(&a.profit_prem));
    info!(
        submitted,
        surviving = verified.len(),
        "Verification complete"
    );
    Ok(verified)
}

/// Upgrade cost re-derived from the enchant delta between the ids —
/// the original strategy label is display metadata only.
fn fresh_upgrade_cost(item: &VerifyItem, mats: &MaterialPrices) -> Option<i64> {
    if item.start_id == item.end_id {
        return Some(0);
    }

    let start = enchant_level(&item.start_id);
    let end = enchant_level(&item.end_id);
    let count = i64::from(item.mat_count);

    if start == 0 && end == MAX_ENCHANT {
        let (rune, soul, relic) = (mats.rune?, mats.soul?, mats.relic?);
        return Some((rune + soul + relic) * count);
    }
    match MaterialKind::for_target(end) {
        Some(kind) => Some(mats.get(kind)? * count),
        None => Some(0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
