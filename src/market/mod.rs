//! Upstream market data integration.
//!
//! Defines the `PriceSource` trait the engine consumes, the concrete
//! Albion Data Project client, the batched fetch helper, and the
//! per-tier material price resolver.

pub mod client;
pub mod fetch;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::types::PriceQuote;

/// Abstraction over the upstream price service.
///
/// One call returns all matching quotes for the requested item ids ×
/// locations × qualities. Implementors may fail; callers in the scan
/// path absorb failures as missing data rather than propagating them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_quotes(
        &self,
        item_ids: &[String],
        locations: &[String],
        qualities: &[u8],
    ) -> Result<Vec<PriceQuote>>;
}

// ---------------------------------------------------------------------------
// Quote lookup
// ---------------------------------------------------------------------------

/// Indexed view over a batch of quotes, keyed by (item, city, quality).
///
/// Absent tuples and zero prices both read back as `None` — the
/// upstream reports "no observation" as a zero price.
#[derive(Debug, Default)]
pub struct QuoteBook {
    entries: HashMap<(String, String, u8), (i64, i64)>,
}

impl QuoteBook {
    pub fn from_quotes(quotes: Vec<PriceQuote>) -> Self {
        let mut entries = HashMap::with_capacity(quotes.len());
        for q in quotes {
            entries.insert(
                (q.item_id, q.city, q.quality),
                (q.sell_price_min, q.buy_price_max),
            );
        }
        Self { entries }
    }

    /// Acquisition cost: the cheapest standing sell order.
    pub fn buy_price(&self, item_id: &str, city: &str, quality: u8) -> Option<i64> {
        self.lookup(item_id, city, quality)
            .map(|(sell_min, _)| sell_min)
            .filter(|p| *p > 0)
    }

    /// Realised sale price: the best standing buy order.
    pub fn sell_price(&self, item_id: &str, city: &str, quality: u8) -> Option<i64> {
        self.lookup(item_id, city, quality)
            .map(|(_, buy_max)| buy_max)
            .filter(|p| *p > 0)
    }

    fn lookup(&self, item_id: &str, city: &str, quality: u8) -> Option<(i64, i64)> {
        self.entries
            .get(&(item_id.to_string(), city.to_string(), quality))
            .copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
