//! Category scan pipeline.
//!
//! Drives one full scan: resolve material prices for every tier
//! concurrently, fetch item quotes for the whole tier × base ×
//! enchant cross-product in sequential batches, then walk every
//! (tier, base, quality, target) cell through strategy evaluation and
//! profit filtering. Missing upstream data shrinks the result; it
//! never fails the scan.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::engine::evaluator::best_acquisition;
use crate::engine::profit::taxed_profit;
use crate::engine::ScanError;
use crate::market::fetch::{fetch_quotes_batched, resolve_materials_for_tiers};
use crate::market::{PriceSource, QuoteBook};
use crate::types::{
    quality_name, FlipCandidate, ItemId, MaterialPrices, BLACK_MARKET, MAX_ENCHANT, QUALITIES,
    TIERS,
};

pub struct FlipScanner {
    source: Arc<dyn PriceSource>,
    config: Arc<AppConfig>,
}

impl FlipScanner {
    pub fn new(source: Arc<dyn PriceSource>, config: Arc<AppConfig>) -> Self {
        Self { source, config }
    }

    /// Scan one city × category and return profitable flips, sorted by
    /// premium profit descending. Parameters are validated before any
    /// fetch is attempted.
    pub async fn scan(&self, city: &str, category: &str) -> Result<Vec<FlipCandidate>, ScanError> {
        if !self.config.is_known_city(city) {
            return Err(ScanError::UnknownCity(city.to_string()));
        }
        let cat = self
            .config
            .category(category)
            .ok_or_else(|| ScanError::UnknownCategory(category.to_string()))?;

        info!(
            city,
            category,
            bases = cat.base_items.len(),
            "Starting category scan"
        );

        // Material prices for all tiers, fetched concurrently.
        let materials: HashMap<u8, MaterialPrices> =
            resolve_materials_for_tiers(&*self.source, &TIERS, city)
                .await
                .into_iter()
                .collect();

        // Item quotes for the full cross-product, in sequential batches
        // against both the scan city and the Black Market.
        let mut item_ids = Vec::with_capacity(TIERS.len() * cat.base_items.len() * 4);
        for &tier in &TIERS {
            for base in &cat.base_items {
                for enchant in 0..=MAX_ENCHANT {
                    item_ids.push(ItemId::new(tier, base, enchant).to_string());
                }
            }
        }
        let locations = vec![city.to_string(), BLACK_MARKET.to_string()];
        let quotes = fetch_quotes_batched(
            &*self.source,
            &item_ids,
            &locations,
            &QUALITIES,
            self.config.market_data.batch_size,
        )
        .await;
        info!(ids = item_ids.len(), quotes = quotes.len(), "Quotes fetched");
        let book = QuoteBook::from_quotes(quotes);

        // Evaluate every cell. Each quality prices independently, so
        // there is no early exit across qualities or targets.
        let mut candidates = Vec::new();
        for &tier in &TIERS {
            let mats = materials
                .get(&tier)
                .copied()
                .unwrap_or_else(MaterialPrices::unavailable);

            for base in &cat.base_items {
                let level_ids: [String; 4] =
                    std::array::from_fn(|e| ItemId::new(tier, base, e as u8).to_string());

                for &quality in &QUALITIES {
                    let buy: [Option<i64>; 4] =
                        std::array::from_fn(|e| book.buy_price(&level_ids[e], city, quality));

                    for target in 0..=MAX_ENCHANT {
                        let end_id = &level_ids[target as usize];
                        let Some(sell_price) = book.sell_price(end_id, BLACK_MARKET, quality)
                        else {
                            continue;
                        };
                        let Some(acq) =
                            best_acquisition(target, &buy, &mats, cat.material_count)
                        else {
                            continue;
                        };

                        let profit = taxed_profit(sell_price, acq.total_cost());
                        if !profit.is_worthwhile() {
                            continue;
                        }

                        debug!(
                            item = %end_id,
                            quality,
                            strategy = %acq.strategy,
                            cost = acq.total_cost(),
                            sell = sell_price,
                            profit = profit.premium,
                            "Flip found"
                        );
                        candidates.push(FlipCandidate {
                            item_start: level_ids[acq.start_level as usize].clone(),
                            item_end: end_id.clone(),
                            tier,
                            quality,
                            quality_name: quality_name(quality),
                            strategy: acq.strategy,
                            start_price: acq.start_price,
                            upgrade_cost: acq.upgrade_cost,
                            upgrade_details: acq.materials,
                            sell_price,
                            profit_prem: profit.premium,
                            profit_non_prem: profit.standard,
                            mat_count: cat.material_count,
                        });
                    }
                }
            }
        }

        // Stable sort keeps discovery order between equal profits.
        candidates.sort_by(|a, b| b.profit_prem.cmp(&a.profit_prem));
        info!(candidates = candidates.len(), "Category scan complete");
        Ok(candidates)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CategoryConfig, ItemsConfig, MarketDataConfig, ScanConfig, ServerConfig, StorageConfig,
    };
    use crate::market::MockPriceSource;
    use crate::types::PriceQuote;

    fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig { port: 0 },
            market_data: MarketDataConfig {
                base_url: "http://unused.example".into(),
                request_timeout_secs: 1,
                batch_size: 70,
            },
            scan: ScanConfig {
                cities: vec!["Martlock".into()],
            },
            items: ItemsConfig {
                name_db_url: "http://unused.example".into(),
            },
            storage: StorageConfig {
                hidden_items_file: "unused.json".into(),
            },
            categories: [(
                "ARMOR".to_string(),
                CategoryConfig {
                    base_items: vec!["ARMOR_PLATE_SET1".into()],
                    material_count: 192,
                },
            )]
            .into_iter()
            .collect(),
        })
    }

    fn quote(item: &str, city: &str, quality: u8, sell_min: i64, buy_max: i64) -> PriceQuote {
        PriceQuote {
            item_id: item.to_string(),
            city: city.to_string(),
            quality,
            sell_price_min: sell_min,
            buy_price_max: buy_max,
        }
    }

    /// Mock source that answers material queries (quality pinned to 1,
    /// rune priced at 2) and serves quotes for a single rune flip.
    fn rune_flip_source() -> MockPriceSource {
        let mut source = MockPriceSource::new();
        source.expect_fetch_quotes().returning(|ids, _, _| {
            if ids.iter().any(|id| id.contains("RUNE")) {
                Ok(vec![
                    quote(&ids[0], "Martlock", 1, 2, 0),      // rune @ 2
                    quote(&ids[1], "Martlock", 1, 1000, 0),   // soul
                    quote(&ids[2], "Martlock", 1, 5000, 0),   // relic
                ])
            } else {
                Ok(vec![
                    quote("T4_ARMOR_PLATE_SET1", "Martlock", 1, 1000, 0),
                    quote("T4_ARMOR_PLATE_SET1@1", "Martlock", 1, 1500, 0),
                    quote("T4_ARMOR_PLATE_SET1@1", "Black Market", 1, 0, 2000),
                ])
            }
        });
        source
    }

    #[tokio::test]
    async fn test_scan_rejects_unknown_city() {
        let scanner = FlipScanner::new(Arc::new(MockPriceSource::new()), test_config());
        let err = scanner.scan("Atlantis", "ARMOR").await.unwrap_err();
        assert!(matches!(err, ScanError::UnknownCity(_)));
    }

    #[tokio::test]
    async fn test_scan_rejects_unknown_category() {
        let scanner = FlipScanner::new(Arc::new(MockPriceSource::new()), test_config());
        let err = scanner.scan("Martlock", "FISHING_ROD").await.unwrap_err();
        assert!(matches!(err, ScanError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn test_scan_finds_rune_flip() {
        let scanner = FlipScanner::new(Arc::new(rune_flip_source()), test_config());
        let flips = scanner.scan("Martlock", "ARMOR").await.unwrap();

        assert_eq!(flips.len(), 1);
        let flip = &flips[0];
        assert_eq!(flip.item_start, "T4_ARMOR_PLATE_SET1");
        assert_eq!(flip.item_end, "T4_ARMOR_PLATE_SET1@1");
        assert_eq!(flip.strategy.to_string(), "Enchant .0 -> .1");
        assert_eq!(flip.start_price, 1000);
        assert_eq!(flip.upgrade_cost, 384);
        assert_eq!(flip.sell_price, 2000);
        assert_eq!(flip.profit_prem, 536);
        assert_eq!(flip.profit_non_prem, 456);
        assert_eq!(flip.mat_count, 192);
    }

    #[tokio::test]
    async fn test_scan_is_deterministic() {
        let scanner = FlipScanner::new(Arc::new(rune_flip_source()), test_config());
        let first = scanner.scan("Martlock", "ARMOR").await.unwrap();
        let second = scanner.scan("Martlock", "ARMOR").await.unwrap();
        let a = serde_json::to_value(&first).unwrap();
        let b = serde_json::to_value(&second).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_scan_upstream_failure_yields_empty_list() {
        let mut source = MockPriceSource::new();
        source
            .expect_fetch_quotes()
            .returning(|_, _, _| Err(anyhow::anyhow!("connection reset")));

        let scanner = FlipScanner::new(Arc::new(source), test_config());
        let flips = scanner.scan("Martlock", "ARMOR").await.unwrap();
        assert!(flips.is_empty());
    }

    #[tokio::test]
    async fn test_scan_skips_targets_without_sell_price() {
        let mut source = MockPriceSource::new();
        source.expect_fetch_quotes().returning(|ids, _, _| {
            if ids.iter().any(|id| id.contains("RUNE")) {
                Ok(Vec::new())
            } else {
                // Buyable everywhere but no Black Market interest.
                Ok(vec![quote("T4_ARMOR_PLATE_SET1", "Martlock", 1, 10, 0)])
            }
        });

        let scanner = FlipScanner::new(Arc::new(source), test_config());
        let flips = scanner.scan("Martlock", "ARMOR").await.unwrap();
        assert!(flips.is_empty());
    }

    #[tokio::test]
    async fn test_scan_sorts_by_premium_profit_descending() {
        let mut source = MockPriceSource::new();
        source.expect_fetch_quotes().returning(|ids, _, _| {
            if ids.iter().any(|id| id.contains("RUNE")) {
                Ok(Vec::new())
            } else {
                Ok(vec![
                    // Quality 1: small margin. Quality 2: big margin.
                    quote("T4_ARMOR_PLATE_SET1", "Martlock", 1, 1000, 0),
                    quote("T4_ARMOR_PLATE_SET1", "Black Market", 1, 0, 1200),
                    quote("T4_ARMOR_PLATE_SET1", "Martlock", 2, 1000, 0),
                    quote("T4_ARMOR_PLATE_SET1", "Black Market", 2, 0, 5000),
                ])
            }
        });

        let scanner = FlipScanner::new(Arc::new(source), test_config());
        let flips = scanner.scan("Martlock", "ARMOR").await.unwrap();
        assert_eq!(flips.len(), 2);
        assert!(flips[0].profit_prem >= flips[1].profit_prem);
        assert_eq!(flips[0].quality, 2);
    }

    #[tokio::test]
    async fn test_scan_properties_hold() {
        let scanner = FlipScanner::new(Arc::new(rune_flip_source()), test_config());
        let flips = scanner.scan("Martlock", "ARMOR").await.unwrap();
        for flip in &flips {
            assert!(flip.profit_prem > 0);
            assert!(flip.profit_non_prem <= flip.profit_prem);
        }
    }
}
